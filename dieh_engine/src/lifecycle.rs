//! Drive error state lifecycle and media threshold commands.
//!
//! | Operation | Error tags | Tripped bitmaps | `io_counter` |
//! |-----------|------------|-----------------|--------------|
//! | [`init_drive`] | zeroed | untouched | `INITIAL_IO_COUNTER` |
//! | [`clear_drive`] | zeroed | untouched | kept |
//! | [`reset_completed`] | reset tag charged | untouched | kept |
//! | [`reactivate_drive`] | kept | re-armed where ratio allows | kept |

use tracing::{debug, info};

use dieh_common::consts::{INITIAL_IO_COUNTER, WEIGHT_CHANGE_NONE};
use dieh_common::dieh::category::{DiehState, DriveErrorState, ErrorCategory, MediaThresholdMode};
use dieh_common::dieh::config::ThresholdRecord;
use dieh_common::dieh::error::DiehError;

use crate::action::reactivate_action_flags;
use crate::ratio::{apply_error, compute_ratio};

/// Bring a newly discovered drive to its starting state.
pub fn init_drive(drive: &mut DriveErrorState) {
    drive.io_counter = INITIAL_IO_COUNTER;
    drive.last_error_time = 0;
    clear_drive(drive);
    info!(io_counter = drive.io_counter, "drive error state initialized");
}

/// Drop all error debt. Latches are owned by [`DiehState`] and stay as they are.
pub fn clear_drive(drive: &mut DriveErrorState) {
    drive.clear();
    debug!("drive error tags cleared");
}

/// Account one completed drive reset against the reset budget.
///
/// Returns the new reset tag.
pub fn reset_completed(
    record: Option<&ThresholdRecord>,
    drive: &mut DriveErrorState,
) -> Result<u64, DiehError> {
    let record = record.ok_or(DiehError::MissingConfiguration)?;
    let cfg = &record.reset;
    let tag = apply_error(
        cfg,
        ErrorCategory::Reset,
        drive.io_counter,
        drive.error_tag(ErrorCategory::Reset),
        cfg.weight,
    )?;
    *drive.error_tag_mut(ErrorCategory::Reset) = tag;
    info!(reset_tag = tag, io_counter = drive.io_counter, "drive reset accounted");
    Ok(tag)
}

/// Re-arm every category whose current ratio has fallen far enough.
///
/// Periodic reassessment entry point: no error is charged. Categories with
/// a zero interval are skipped.
pub fn reactivate_drive(record: &ThresholdRecord, dieh: &mut DiehState, drive: &DriveErrorState) {
    for category in ErrorCategory::ALL {
        let cfg = record.stat(category);
        let Ok(ratio) = compute_ratio(cfg, category, drive.io_counter, drive.error_tag(category))
        else {
            continue;
        };
        let released = reactivate_action_flags(cfg, dieh.tripped_mut(category), ratio);
        if !released.is_empty() {
            info!(?category, ratio, released = released.bits(), "actions reactivated");
        }
    }
}

// ─── Media Threshold Commands ───────────────────────────────────────

/// Request from the RAID layer while it runs extended media error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaThresholdCommand {
    /// Back to configured thresholds.
    RestoreDefaults,
    /// Raise media thresholds by `percent`: weights scale by `100 / (100 + percent)`.
    Increase { percent: u32 },
    /// Freeze media ratio growth (EMEH).
    Disable,
}

/// Apply a media threshold command. Returns `false` if it was ignored.
///
/// `Increase` is accepted only while no adjustment is in place, which
/// includes the disabled mode, and clears the drive error tags so the new
/// weights start from a clean window.
pub fn apply_media_threshold(
    dieh: &mut DiehState,
    drive: &mut DriveErrorState,
    command: MediaThresholdCommand,
) -> bool {
    match command {
        MediaThresholdCommand::RestoreDefaults => {
            dieh.mode = MediaThresholdMode::Default;
            dieh.media_weight_adjust = WEIGHT_CHANGE_NONE;
        }
        MediaThresholdCommand::Increase { percent } => {
            if dieh.media_weight_adjust != WEIGHT_CHANGE_NONE {
                debug!(mode = ?dieh.mode, adjust = dieh.media_weight_adjust, "threshold increase ignored");
                return false;
            }
            dieh.media_weight_adjust = increased_weight_adjust(percent);
            dieh.mode = MediaThresholdMode::Increased;
            drive.clear();
        }
        MediaThresholdCommand::Disable => {
            dieh.mode = MediaThresholdMode::Disabled;
            dieh.media_weight_adjust = WEIGHT_CHANGE_NONE;
        }
    }
    info!(?command, mode = ?dieh.mode, adjust = dieh.media_weight_adjust, "media threshold changed");
    true
}

/// Weight multiplier [%] that raises every threshold by `percent`.
#[inline]
pub fn increased_weight_adjust(percent: u32) -> u32 {
    let adjust = 100 * 100 / (100 + u64::from(percent));
    adjust as u32
}
