//! DIEH engine error taxonomy.
//!
//! Configuration errors abort the operation and leave drive state as it was;
//! the caller falls back to ratio 0 / no action. Out-of-range action indices
//! are internal logic errors and never touch unrelated latch bits.

use thiserror::Error;

use super::category::ErrorCategory;

/// Errors returned by the DIEH engine entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiehError {
    /// No threshold record is registered for the drive.
    #[error("no DIEH threshold record registered for drive")]
    MissingConfiguration,

    /// A category window of zero I/Os makes every ratio undefined.
    #[error("{category:?} category has a zero interval")]
    ZeroInterval { category: ErrorCategory },

    /// Latch bit index beyond the 32-bit tripped bitmap.
    #[error("action index {index} outside the tripped bitmap")]
    ActionIndexOutOfRange { index: usize },
}
