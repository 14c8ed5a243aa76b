//! Error categories and persisted per-drive DIEH state.
//!
//! Two records are kept per physical drive:
//! - [`DriveErrorState`]: the I/O counter and one decaying error tag per
//!   category. Wiped on drive-error clear and physical reset.
//! - [`DiehState`]: tripped-action latches, the media weight adjustment and
//!   call-home latches. Survives a clear.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::consts::{INITIAL_IO_COUNTER, WEIGHT_CHANGE_NONE};

use super::error::DiehError;
use super::flags::ActionFlags;

/// Number of error categories tracked per drive.
pub const CATEGORY_COUNT: usize = 9;

/// Error category (bucket) with its own interval, weight and rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ErrorCategory {
    /// Cumulative bucket, charged by every device-level error.
    Io = 0,
    Recovered = 1,
    Media = 2,
    Hardware = 3,
    Link = 4,
    HealthCheck = 5,
    Data = 6,
    /// Drive resets (legacy escalation).
    Reset = 7,
    /// Power cycles (legacy escalation).
    PowerCycle = 8,
}

impl ErrorCategory {
    /// All categories in storage order.
    pub const ALL: [Self; CATEGORY_COUNT] = [
        Self::Io,
        Self::Recovered,
        Self::Media,
        Self::Hardware,
        Self::Link,
        Self::HealthCheck,
        Self::Data,
        Self::Reset,
        Self::PowerCycle,
    ];

    /// Storage index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

// ─── Tripped Actions ────────────────────────────────────────────────

/// Latch bitmap of one category: bit *i* is set while `actions[i]` is tripped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrippedActions(u32);

impl TrippedActions {
    /// Nothing tripped.
    pub const NONE: Self = Self(0);

    /// Wrap a raw bitmap.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bitmap.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// True if no rule is latched.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether rule `index` is latched. Out-of-range indices read as not tripped.
    pub fn is_tripped(&self, index: usize) -> bool {
        match Self::mask(index) {
            Ok(mask) => self.0 & mask != 0,
            Err(_) => false,
        }
    }

    /// Latch rule `index`.
    pub fn trip(&mut self, index: usize) {
        if let Ok(mask) = Self::mask(index) {
            self.0 |= mask;
        }
    }

    /// Release rule `index`.
    pub fn clear(&mut self, index: usize) {
        if let Ok(mask) = Self::mask(index) {
            self.0 &= !mask;
        }
    }

    /// Single-bit mask for `index`, or a logged internal error.
    pub fn mask(index: usize) -> Result<u32, DiehError> {
        if index < u32::BITS as usize {
            Ok(1u32 << index)
        } else {
            let err = DiehError::ActionIndexOutOfRange { index };
            error!(%err, "internal logic error, treated as not tripped");
            Err(err)
        }
    }
}

// ─── Drive Error State ──────────────────────────────────────────────

/// Persisted error counters of one physical drive.
///
/// Invariant: every error tag is `<= io_counter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveErrorState {
    /// Completed I/O count. Owned by the drive object, monotonically non-decreasing.
    pub io_counter: u64,
    /// Error tag per category, indexed by [`ErrorCategory::index`].
    pub error_tags: [u64; CATEGORY_COUNT],
    /// Time of the last counted error [ms].
    pub last_error_time: u64,
}

impl DriveErrorState {
    /// State of a freshly discovered drive: counter far past every window,
    /// no error debt.
    pub const fn new() -> Self {
        Self {
            io_counter: INITIAL_IO_COUNTER,
            error_tags: [0; CATEGORY_COUNT],
            last_error_time: 0,
        }
    }

    /// Error tag of `category`.
    #[inline]
    pub const fn error_tag(&self, category: ErrorCategory) -> u64 {
        self.error_tags[category.index()]
    }

    /// Mutable error tag of `category`.
    #[inline]
    pub fn error_tag_mut(&mut self, category: ErrorCategory) -> &mut u64 {
        &mut self.error_tags[category.index()]
    }

    /// Zero all error tags. The counter and last error time are kept.
    pub fn clear(&mut self) {
        self.error_tags = [0; CATEGORY_COUNT];
    }

    /// Count `count` successful I/Os.
    #[inline]
    pub fn record_successes(&mut self, count: u64) {
        self.io_counter = self.io_counter.saturating_add(count);
    }
}

impl Default for DriveErrorState {
    fn default() -> Self {
        Self::new()
    }
}

// ─── DIEH State ─────────────────────────────────────────────────────

/// Media threshold mode set by the RAID layer during extended media error handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MediaThresholdMode {
    /// Configured thresholds.
    #[default]
    Default = 0,
    /// Media-related weights reduced (thresholds effectively raised).
    Increased = 1,
    /// Media ratio growth frozen (EMEH).
    Disabled = 2,
}

/// Persisted latches of one physical drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiehState {
    /// Tripped-action bitmap per category.
    pub tripped: [TrippedActions; CATEGORY_COUNT],
    /// Multiplier [%] applied to media-related weights.
    pub media_weight_adjust: u32,
    /// Current media threshold mode.
    pub mode: MediaThresholdMode,
    /// End-of-life call home already emitted.
    pub eol_call_home_sent: bool,
    /// Fail call home already emitted.
    pub kill_call_home_sent: bool,
}

impl DiehState {
    pub const fn new() -> Self {
        Self {
            tripped: [TrippedActions::NONE; CATEGORY_COUNT],
            media_weight_adjust: WEIGHT_CHANGE_NONE,
            mode: MediaThresholdMode::Default,
            eol_call_home_sent: false,
            kill_call_home_sent: false,
        }
    }

    /// Latch bitmap of `category`.
    #[inline]
    pub const fn tripped(&self, category: ErrorCategory) -> TrippedActions {
        self.tripped[category.index()]
    }

    /// Mutable latch bitmap of `category`.
    #[inline]
    pub fn tripped_mut(&mut self, category: ErrorCategory) -> &mut TrippedActions {
        &mut self.tripped[category.index()]
    }

    /// Whether extended media error handling is active.
    #[inline]
    pub const fn is_emeh(&self) -> bool {
        matches!(self.mode, MediaThresholdMode::Disabled)
    }

    /// Drop call-home requests that were already emitted and latch the new ones.
    pub fn filter_call_home(&mut self, mut actions: ActionFlags) -> ActionFlags {
        if !actions.intersects(ActionFlags::CALL_HOME_MASK) {
            return actions;
        }
        if actions.contains(ActionFlags::END_OF_LIFE_CALL_HOME) {
            if self.eol_call_home_sent {
                actions.remove(ActionFlags::END_OF_LIFE_CALL_HOME);
            } else {
                self.eol_call_home_sent = true;
            }
        }
        if actions.contains(ActionFlags::FAIL_CALL_HOME) {
            if self.kill_call_home_sent {
                actions.remove(ActionFlags::FAIL_CALL_HOME);
            } else {
                self.kill_call_home_sent = true;
            }
        }
        actions
    }
}

impl Default for DiehState {
    fn default() -> Self {
        Self::new()
    }
}
