use super::ProgressDetail;
use crate::core::{PipelineState, ProcessingStatus};
use crate::error::TrimError;
use crate::fetch::FetchProgress;
use log::debug;

// Overall progress budget of one run
pub(crate) const FETCH_START: u8 = 10;
pub(crate) const FETCH_END: u8 = 30;
pub(crate) const COMBINE: u8 = 35;
pub(crate) const DECODE: u8 = 50;
pub(crate) const SELECT: u8 = 60;
pub(crate) const COPY_START: u8 = 70;
pub(crate) const COPY_END: u8 = 90;
pub(crate) const ENCODE_START: u8 = 90;
pub(crate) const FINALIZE: u8 = 95;
pub(crate) const COMPLETE: u8 = 100;

/// Emits statuses for one run, keeping progress monotonic
pub(crate) struct StatusReporter<'a> {
    sink: &'a mut dyn FnMut(ProcessingStatus),
    detail: ProgressDetail,
    last_progress: u8,
    last_slice: Option<(PipelineState, u64)>,
}

impl<'a> StatusReporter<'a> {
    pub(crate) fn new(sink: &'a mut dyn FnMut(ProcessingStatus), detail: ProgressDetail) -> Self {
        StatusReporter {
            sink,
            detail,
            last_progress: 0,
            last_slice: None,
        }
    }

    fn emit(&mut self, state: PipelineState, progress: u8, message: String) {
        let progress = progress.max(self.last_progress).min(COMPLETE);
        self.last_progress = progress;
        debug!("[{}] {}% {}", state.name(), progress, message);
        (self.sink)(ProcessingStatus::new(state, progress, message));
    }

    /// Report entry into a stage (or a milestone inside it)
    pub(crate) fn enter(&mut self, state: PipelineState, progress: u8, message: &str) {
        self.last_slice = None;
        self.emit(state, progress, message.to_string());
    }

    /// Report slice progress, at most once per whole stage percent
    pub(crate) fn slice(
        &mut self,
        state: PipelineState,
        overall: f64,
        done: u64,
        total: u64,
        label: &str,
    ) {
        if self.detail == ProgressDetail::Coarse || total == 0 {
            return;
        }
        let percent = done.min(total) * 100 / total;
        if self.last_slice == Some((state, percent)) {
            return;
        }
        self.last_slice = Some((state, percent));
        self.emit(state, overall as u8, format!("{}: {}%", label, percent));
    }

    /// Report download progress
    pub(crate) fn fetch(&mut self, progress: FetchProgress) {
        if self.detail == ProgressDetail::Coarse {
            return;
        }
        match progress.fraction() {
            Some(fraction) => {
                let span = (FETCH_END - FETCH_START) as f64;
                let overall = FETCH_START as f64 + span * fraction;
                self.emit(
                    PipelineState::Fetching,
                    overall as u8,
                    format!("Downloading: {}%", (fraction * 100.0).round() as u8),
                );
            }
            None => {
                let mib = progress.received as f64 / (1024.0 * 1024.0);
                self.emit(
                    PipelineState::Fetching,
                    FETCH_START,
                    format!("Downloaded {:.1} MiB", mib),
                );
            }
        }
    }

    pub(crate) fn complete(&mut self, message: &str) {
        self.emit(PipelineState::Completed, COMPLETE, message.to_string());
    }

    pub(crate) fn fail(&mut self, err: &TrimError) {
        self.last_progress = 0;
        (self.sink)(ProcessingStatus::failed(err));
    }

    /// Return to `Idle`, the only place progress goes back to zero without an error
    pub(crate) fn reset(&mut self, message: &str) {
        self.last_progress = 0;
        self.last_slice = None;
        (self.sink)(ProcessingStatus::new(PipelineState::Idle, 0, message));
    }
}

/// Linear position inside a progress span
pub(crate) fn span_progress(start: u8, end: u8, done: u64, total: u64) -> f64 {
    if total == 0 {
        return end as f64;
    }
    start as f64 + (end - start) as f64 * (done.min(total) as f64 / total as f64)
}
