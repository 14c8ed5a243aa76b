//! Error and action bitflag types (DIEH input and output).
//!
//! All flag sets use the `bitflags` crate. An empty set plays the role of
//! `NoError` on input and `NoAction` on output.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-I/O error classification produced by the sense-code tables.
    ///
    /// SHORT-CIRCUIT flags (no category update): PORT, FATAL, NOT_SPINNING.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorFlags: u16 {
        /// Error never reached the device (port/transport level).
        const PORT                  = 0x0001;
        /// Unrecoverable device fault. **SHORT-CIRCUIT → FAIL**.
        const FATAL                 = 0x0002;
        /// Drive reported it is not spinning. **SHORT-CIRCUIT → SPINUP**.
        const NOT_SPINNING          = 0x0004;
        /// Recovered error.
        const RECOVERED             = 0x0008;
        /// Media error.
        const MEDIA                 = 0x0010;
        /// Hardware error.
        const HARDWARE              = 0x0020;
        /// Link error.
        const LINK                  = 0x0040;
        /// Health check request.
        const HEALTH_CHECK          = 0x0080;
        /// Data error.
        const DATA                  = 0x0100;
        /// Drive reported end of life.
        const END_OF_LIFE           = 0x0200;
        /// Drive reported end of life, call home requested.
        const END_OF_LIFE_CALL_HOME = 0x0400;
        /// Fatal error with call home.
        const FATAL_CALL_HOME       = 0x0800;
    }
}

impl ErrorFlags {
    /// No error at all.
    pub const NO_ERROR: Self = Self::empty();

    /// Flags that return before any category is touched.
    pub const SHORT_CIRCUIT_MASK: Self = Self::from_bits_truncate(
        Self::PORT.bits() | Self::FATAL.bits() | Self::NOT_SPINNING.bits(),
    );

    /// Flags that prove the link delivered a device response.
    pub const LINK_PROOF_MASK: Self =
        Self::from_bits_truncate(Self::RECOVERED.bits() | Self::MEDIA.bits());

    /// Returns true if this event is handled without touching the ratios.
    #[inline]
    pub const fn is_short_circuit(&self) -> bool {
        self.intersects(Self::SHORT_CIRCUIT_MASK)
    }
}

impl Default for ErrorFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Recovery actions requested from the drive object state machine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionFlags: u16 {
        /// Issue a drive reset.
        const RESET                 = 0x0001;
        /// Power-cycle the drive slot.
        const POWER_CYCLE           = 0x0002;
        /// Spin the drive up.
        const SPINUP                = 0x0004;
        /// Mark end of life (proactive sparing).
        const END_OF_LIFE           = 0x0008;
        /// End of life with call home.
        const END_OF_LIFE_CALL_HOME = 0x0010;
        /// Fail the drive.
        const FAIL                  = 0x0020;
        /// Fail with call home.
        const FAIL_CALL_HOME        = 0x0040;
        /// Log an event only.
        const EVENT                 = 0x0080;
    }
}

impl ActionFlags {
    /// Nothing to do.
    pub const NO_ACTION: Self = Self::empty();

    /// Actions that emit a call-home event.
    pub const CALL_HOME_MASK: Self = Self::from_bits_truncate(
        Self::END_OF_LIFE_CALL_HOME.bits() | Self::FAIL_CALL_HOME.bits(),
    );
}

impl Default for ActionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Single action named by a rule-table entry.
///
/// Configuration stores one `ActionKind` per rule; the evaluator ORs the
/// corresponding [`ActionFlags`] bit into its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ActionKind {
    Reset = 0,
    PowerCycle = 1,
    Spinup = 2,
    EndOfLife = 3,
    EndOfLifeCallHome = 4,
    Fail = 5,
    FailCallHome = 6,
    Event = 7,
}

impl ActionKind {
    /// Flag bit carried by this action.
    #[inline]
    pub const fn flag(self) -> ActionFlags {
        match self {
            Self::Reset => ActionFlags::RESET,
            Self::PowerCycle => ActionFlags::POWER_CYCLE,
            Self::Spinup => ActionFlags::SPINUP,
            Self::EndOfLife => ActionFlags::END_OF_LIFE,
            Self::EndOfLifeCallHome => ActionFlags::END_OF_LIFE_CALL_HOME,
            Self::Fail => ActionFlags::FAIL,
            Self::FailCallHome => ActionFlags::FAIL_CALL_HOME,
            Self::Event => ActionFlags::EVENT,
        }
    }
}
