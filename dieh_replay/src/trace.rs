//! Completion trace format.
//!
//! One JSON object per line, selected by `"step"`. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! {"step": "success", "count": 5000}
//! {"step": "error", "at_ms": 1200, "flags": ["media", "recovered"], "opcode": 136}
//! {"step": "reset_completed"}
//! {"step": "media_threshold", "cmd": "increase", "percent": 20}
//! {"step": "clear"}
//! {"step": "reactivate"}
//! ```

use serde::Deserialize;

use dieh_common::dieh::event::ErrorEvent;
use dieh_common::dieh::flags::ErrorFlags;
use dieh_engine::lifecycle::MediaThresholdCommand;

use crate::error::ReplayError;

/// Media threshold command as written in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCommandName {
    RestoreDefaults,
    Increase,
    Disable,
}

/// One trace step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// `count` successful I/Os.
    Success {
        #[serde(default = "one")]
        count: u64,
    },
    /// One failed I/O.
    Error {
        /// Completion time; the replay clock keeps its value when absent.
        #[serde(default)]
        at_ms: Option<u64>,
        flags: Vec<String>,
        #[serde(default)]
        opcode: u8,
        #[serde(default)]
        port_status: u32,
        #[serde(default)]
        sense_key: u8,
        #[serde(default)]
        asc: u8,
        #[serde(default)]
        ascq: u8,
    },
    /// The caller finished a drive reset.
    ResetCompleted,
    /// Drive error clear.
    Clear,
    MediaThreshold {
        cmd: MediaCommandName,
        #[serde(default)]
        percent: u32,
    },
    /// Periodic reactivation pass.
    Reactivate,
}

fn one() -> u64 {
    1
}

impl Step {
    /// Name used in replay output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
            Self::ResetCompleted => "reset_completed",
            Self::Clear => "clear",
            Self::MediaThreshold { .. } => "media_threshold",
            Self::Reactivate => "reactivate",
        }
    }
}

/// Parse one trace line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Step>, ReplayError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|e| ReplayError::Parse {
            line,
            message: e.to_string(),
        })
}

/// Resolve flag names (case-insensitive, e.g. `"health_check"`).
pub fn parse_flags(line: usize, names: &[String]) -> Result<ErrorFlags, ReplayError> {
    names.iter().try_fold(ErrorFlags::NO_ERROR, |acc, name| {
        ErrorFlags::from_name(&name.to_ascii_uppercase())
            .map(|flag| acc | flag)
            .ok_or_else(|| ReplayError::UnknownFlag {
                line,
                name: name.clone(),
            })
    })
}

/// Build the engine event of an `error` step.
pub fn error_event(line: usize, step: &Step) -> Result<Option<ErrorEvent>, ReplayError> {
    let Step::Error {
        flags,
        opcode,
        port_status,
        sense_key,
        asc,
        ascq,
        ..
    } = step
    else {
        return Ok(None);
    };
    let event = ErrorEvent::with_flags(parse_flags(line, flags)?)
        .opcode(*opcode)
        .port_status(*port_status)
        .sense(*sense_key, *asc, *ascq);
    Ok(Some(event))
}

/// Engine command of a `media_threshold` step.
pub const fn media_command(cmd: MediaCommandName, percent: u32) -> MediaThresholdCommand {
    match cmd {
        MediaCommandName::RestoreDefaults => MediaThresholdCommand::RestoreDefaults,
        MediaCommandName::Increase => MediaThresholdCommand::Increase { percent },
        MediaCommandName::Disable => MediaThresholdCommand::Disable,
    }
}
