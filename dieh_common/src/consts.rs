//! System-wide constants for the DIEH workspace.
//!
//! Single source of truth for all numeric limits and defaults.
//! Imported by all crates. Do not duplicate these values elsewhere.

use static_assertions::const_assert;

/// Largest error-category interval, in I/O counts (one day at 1000 IOPS).
pub const MAX_INTERVAL: u64 = 86_400_000;

/// `io_counter` value of a freshly discovered drive.
///
/// Twice the largest interval, so every error tag of zero reads as stale.
pub const INITIAL_IO_COUNTER: u64 = 2 * MAX_INTERVAL;

/// Maximum number of action rules per error category.
pub const MAX_ACTIONS: usize = 32;

/// Maximum number of weight exceptions per error category.
pub const MAX_WEIGHT_EXCEPTIONS: usize = 20;

/// Weight change meaning "leave the weight as is" (a 100 % multiplier).
pub const WEIGHT_CHANGE_NONE: u32 = 100;

/// Upper bound of a category ratio.
pub const RATIO_MAX: u32 = 100;

/// Default window in which a second error counts as part of a burst [ms].
pub const DEFAULT_BURST_DELTA_MS: u64 = 100;

/// Default weight discount applied to errors inside a burst [%].
pub const DEFAULT_BURST_WEIGHT_REDUCE: u32 = 20;

/// Default path of the DIEH threshold configuration.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/dieh/dieh.toml";

// Each action rule owns one bit of the `u32` tripped bitmap.
const_assert!(MAX_ACTIONS <= u32::BITS as usize);
const_assert!(INITIAL_IO_COUNTER >= 2 * MAX_INTERVAL);
