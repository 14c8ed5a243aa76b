//! Prelude module for common re-exports.
//!
//! ```rust
//! use dieh_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{INITIAL_IO_COUNTER, MAX_ACTIONS, MAX_INTERVAL, WEIGHT_CHANGE_NONE};

// ─── DIEH Types ─────────────────────────────────────────────────────
pub use crate::dieh::category::{
    DiehState, DriveErrorState, ErrorCategory, MediaThresholdMode, TrippedActions,
};
pub use crate::dieh::config::{
    ActionRule, ExceptionCode, ResetEscalation, SenseCodeRange, StatConfig, ThresholdRecord,
    WeightException,
};
pub use crate::dieh::error::DiehError;
pub use crate::dieh::event::ErrorEvent;
pub use crate::dieh::flags::{ActionFlags, ActionKind, ErrorFlags};
