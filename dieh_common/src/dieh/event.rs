//! Per-I/O error event delivered on the completion path.

use super::flags::ErrorFlags;

/// One failed I/O as seen by DIEH.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Classified error bits.
    pub error_flags: ErrorFlags,
    /// Command opcode of the failed I/O.
    pub opcode: u8,
    /// Port request status.
    pub port_status: u32,
    pub sense_key: u8,
    pub asc: u8,
    pub ascq: u8,
    /// Extended media error handling active for this drive.
    pub is_emeh: bool,
    /// Burst discount [%] applied to the base weight. Filled in by the classifier.
    pub burst_weight_reduce: u32,
}

impl ErrorEvent {
    /// Event carrying only `flags`.
    pub const fn with_flags(error_flags: ErrorFlags) -> Self {
        Self {
            error_flags,
            opcode: 0,
            port_status: 0,
            sense_key: 0,
            asc: 0,
            ascq: 0,
            is_emeh: false,
            burst_weight_reduce: 0,
        }
    }

    /// Builder: set the opcode.
    pub const fn opcode(mut self, opcode: u8) -> Self {
        self.opcode = opcode;
        self
    }

    /// Builder: set the port status.
    pub const fn port_status(mut self, port_status: u32) -> Self {
        self.port_status = port_status;
        self
    }

    /// Builder: set sense key / ASC / ASCQ.
    pub const fn sense(mut self, key: u8, asc: u8, ascq: u8) -> Self {
        self.sense_key = key;
        self.asc = asc;
        self.ascq = ascq;
        self
    }

    /// Builder: mark the event as raised under EMEH.
    pub const fn emeh(mut self, is_emeh: bool) -> Self {
        self.is_emeh = is_emeh;
        self
    }
}
