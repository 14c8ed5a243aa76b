//! Two-level reset escalation: reset → power cycle → fail.
//!
//! Used instead of a plain `RESET` when the threshold record selects
//! [`ResetEscalation::Legacy`](dieh_common::dieh::config::ResetEscalation).
//! The reset category counts completed resets; the power-cycle category is
//! a one-shot budget that is consumed as soon as the reset threshold is
//! breached the first time.

use tracing::{debug, warn};

use dieh_common::dieh::category::{DriveErrorState, ErrorCategory};
use dieh_common::dieh::config::ThresholdRecord;
use dieh_common::dieh::error::DiehError;
use dieh_common::dieh::flags::ActionFlags;

use crate::ratio::compute_ratio;

/// Decide what a requested reset turns into.
pub fn escalate_reset(
    record: &ThresholdRecord,
    drive: &mut DriveErrorState,
) -> Result<ActionFlags, DiehError> {
    let io = drive.io_counter;

    let reset_ratio = compute_ratio(
        &record.reset,
        ErrorCategory::Reset,
        io,
        drive.error_tag(ErrorCategory::Reset),
    )?;
    if reset_ratio < record.reset.threshold {
        return Ok(ActionFlags::RESET);
    }

    let power_cycle_ratio = compute_ratio(
        &record.power_cycle,
        ErrorCategory::PowerCycle,
        io,
        drive.error_tag(ErrorCategory::PowerCycle),
    )?;
    let control = record.legacy_control;

    if power_cycle_ratio >= record.power_cycle.threshold {
        let mut actions = ActionFlags::FAIL;
        if control.fail_call_home {
            actions |= ActionFlags::FAIL_CALL_HOME;
        }
        warn!(reset_ratio, power_cycle_ratio, "reset budget exhausted, failing drive");
        return Ok(actions);
    }

    *drive.error_tag_mut(ErrorCategory::PowerCycle) = io;

    let mut actions = ActionFlags::RESET;
    if control.end_of_life {
        actions |= ActionFlags::END_OF_LIFE;
    }
    if control.end_of_life_call_home {
        actions |= ActionFlags::END_OF_LIFE_CALL_HOME;
    }
    debug!(reset_ratio, power_cycle_ratio, "power-cycle budget consumed");
    Ok(actions)
}
