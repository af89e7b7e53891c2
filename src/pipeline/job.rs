use super::TrimOutcome;
use crate::core::ProcessingStatus;
use crate::error::{TrimError, TrimResult};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::cell::Cell;
use std::thread::JoinHandle;

/// Messages sent from the caller to a running pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Stop at the next checkpoint and discard intermediate buffers
    Cancel,
}

/// Receiving end of a run's control channel, polled at every checkpoint
#[derive(Debug)]
pub struct RunControl {
    rx: Option<Receiver<ControlMessage>>,
    cancelled: Cell<bool>,
}

impl RunControl {
    /// A control that never cancels
    pub fn detached() -> Self {
        RunControl {
            rx: None,
            cancelled: Cell::new(false),
        }
    }

    /// Create a control and the canceller that drives it
    pub fn channel() -> (Canceller, RunControl) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let control = RunControl {
            rx: Some(rx),
            cancelled: Cell::new(false),
        };
        (Canceller { tx }, control)
    }

    /// Fail with [`TrimError::Cancelled`] once a cancel arrived
    ///
    /// Losing every sender counts as a cancel: nobody is left to collect the result.
    pub fn check(&self) -> TrimResult<()> {
        if self.cancelled.get() {
            return Err(TrimError::Cancelled);
        }
        if let Some(rx) = &self.rx {
            match rx.try_recv() {
                Ok(ControlMessage::Cancel) | Err(TryRecvError::Disconnected) => {
                    self.cancelled.set(true);
                    return Err(TrimError::Cancelled);
                }
                Err(TryRecvError::Empty) => {}
            }
        }
        Ok(())
    }
}

/// Cloneable handle that cancels one run
#[derive(Debug, Clone)]
pub struct Canceller {
    tx: Sender<ControlMessage>,
}

impl Canceller {
    /// Request cancellation; a finished run ignores it
    pub fn cancel(&self) {
        let _ = self.tx.send(ControlMessage::Cancel);
    }
}

/// A pipeline run executing on its own worker thread
pub struct TrimJob {
    statuses: Receiver<ProcessingStatus>,
    canceller: Canceller,
    handle: JoinHandle<TrimOutcome>,
}

impl TrimJob {
    pub(crate) fn new(
        statuses: Receiver<ProcessingStatus>,
        canceller: Canceller,
        handle: JoinHandle<TrimOutcome>,
    ) -> Self {
        TrimJob {
            statuses,
            canceller,
            handle,
        }
    }

    /// Status stream of the run; it closes when the run ends
    pub fn statuses(&self) -> &Receiver<ProcessingStatus> {
        &self.statuses
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Get a handle that can cancel the run from another thread
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Check if the worker has finished
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the run ends
    pub fn wait(self) -> TrimOutcome {
        let TrimJob {
            statuses: _statuses,
            canceller,
            handle,
        } = self;
        let outcome = handle.join().unwrap_or_else(|_| TrimOutcome::Failed {
            error: TrimError::Internal("pipeline worker panicked".to_string()),
            fallback: None,
        });
        drop(canceller);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_never_cancels() {
        let control = RunControl::detached();
        for _ in 0..3 {
            assert!(control.check().is_ok());
        }
    }

    #[test]
    fn test_cancel_is_sticky() {
        let (canceller, control) = RunControl::channel();
        assert!(control.check().is_ok());

        canceller.cancel();
        assert!(matches!(control.check(), Err(TrimError::Cancelled)));
        assert!(matches!(control.check(), Err(TrimError::Cancelled)));
    }

    #[test]
    fn test_dropped_canceller_cancels() {
        let (canceller, control) = RunControl::channel();
        drop(canceller);
        assert!(matches!(control.check(), Err(TrimError::Cancelled)));
    }
}
