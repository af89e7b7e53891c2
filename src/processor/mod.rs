//! Trim window selection and copying

pub mod select;
pub mod trim;

pub use select::{PRESET_TRIMS, PresetTrim, select};
pub use trim::TrimCopier;

use crate::error::TrimResult;

/// Callback run between bounded processing slices
///
/// Receives `(units_done, units_total)`. Returning an error aborts the
/// operation; the partial output is dropped.
pub type Checkpoint<'a> = dyn FnMut(u64, u64) -> TrimResult<()> + 'a;
