//! Completion-path dispatcher: routes one error event to its categories.
//!
//! # Processing Order
//!
//! 1. Short-circuits (no category touched):
//!    empty → no action, `PORT` → no action, `FATAL` → `FAIL`,
//!    `NOT_SPINNING` → `SPINUP`.
//! 2. Interval check of every category the event will touch. A zero
//!    interval aborts before any state is mutated.
//! 3. Burst detection and `last_error_time` update.
//! 4. Cumulative `Io` category, then each flagged category in
//!    [`CATEGORY_ROUTES`] order.
//! 5. Pass-through flags, then legacy reset escalation if selected.
//!
//! # EMEH
//!
//! While extended media error handling is active the media weight
//! adjustment is replaced by [`WEIGHT_CHANGE_NONE`] for the io, recovered,
//! media and health-check categories. Hardware and data never receive the
//! adjustment. Link is never frozen so link failures still fail the drive.

use static_assertions::const_assert_eq;
use tracing::{debug, trace, warn};

use dieh_common::consts::WEIGHT_CHANGE_NONE;
use dieh_common::dieh::category::{
    CATEGORY_COUNT, DiehState, DriveErrorState, ErrorCategory, TrippedActions,
};
use dieh_common::dieh::config::{ResetEscalation, StatConfig, ThresholdRecord};
use dieh_common::dieh::error::DiehError;
use dieh_common::dieh::event::ErrorEvent;
use dieh_common::dieh::flags::{ActionFlags, ErrorFlags};

use crate::action::evaluate;
use crate::legacy::escalate_reset;
use crate::ratio::{apply_error, compute_ratio};
use crate::weight::effective_weight;

/// Which caller multiplier a category receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplier {
    /// Media weight adjustment, frozen to `NONE` under EMEH.
    MediaAdjust,
    /// Always `NONE`.
    Unadjusted,
}

/// Error bit → category routing, in processing order.
///
/// `RECOVERED` and `MEDIA` precede `LINK` so the link tag is zeroed before
/// a link error carried by the same event is charged.
pub const CATEGORY_ROUTES: [(ErrorFlags, ErrorCategory, Multiplier); 6] = [
    (ErrorFlags::RECOVERED, ErrorCategory::Recovered, Multiplier::MediaAdjust),
    (ErrorFlags::MEDIA, ErrorCategory::Media, Multiplier::MediaAdjust),
    (ErrorFlags::HARDWARE, ErrorCategory::Hardware, Multiplier::Unadjusted),
    (ErrorFlags::LINK, ErrorCategory::Link, Multiplier::Unadjusted),
    (ErrorFlags::HEALTH_CHECK, ErrorCategory::HealthCheck, Multiplier::MediaAdjust),
    (ErrorFlags::DATA, ErrorCategory::Data, Multiplier::Unadjusted),
];

// Routed categories plus io, reset and power cycle.
const_assert_eq!(CATEGORY_ROUTES.len() + 3, CATEGORY_COUNT);

/// Error bits copied straight into the result.
const PASS_THROUGH: [(ErrorFlags, ActionFlags); 3] = [
    (ErrorFlags::END_OF_LIFE, ActionFlags::END_OF_LIFE),
    (ErrorFlags::END_OF_LIFE_CALL_HOME, ActionFlags::END_OF_LIFE_CALL_HOME),
    (ErrorFlags::FATAL_CALL_HOME, ActionFlags::FAIL_CALL_HOME),
];

// ─── Category Update ────────────────────────────────────────────────

/// Charge `weight` to one category and evaluate its rule table.
///
/// Reactivation is judged on the ratio before the charge, tripping on the
/// ratio after it.
pub fn update_category(
    cfg: &StatConfig,
    category: ErrorCategory,
    io_counter: u64,
    error_tag: &mut u64,
    tripped: &mut TrippedActions,
    weight: u64,
) -> Result<ActionFlags, DiehError> {
    let prior_ratio = compute_ratio(cfg, category, io_counter, *error_tag)?;
    let new_tag = apply_error(cfg, category, io_counter, *error_tag, weight)?;
    let new_ratio = compute_ratio(cfg, category, io_counter, new_tag)?;
    *error_tag = new_tag;

    let actions = evaluate(&cfg.actions, tripped, prior_ratio, new_ratio);
    trace!(?category, weight, new_tag, prior_ratio, new_ratio, ?actions, "category updated");
    Ok(actions)
}

// ─── Dispatcher ─────────────────────────────────────────────────────

/// Handle one failed I/O and return the recovery actions it requires.
///
/// `record` is the threshold record matched to the drive; `None` means the
/// drive has no DIEH configuration. `now_ms` is the completion time used for
/// burst detection.
///
/// # Errors
///
/// [`DiehError::MissingConfiguration`] or [`DiehError::ZeroInterval`]; drive
/// and DIEH state are left untouched in both cases.
pub fn handle_io_error(
    record: Option<&ThresholdRecord>,
    dieh: &mut DiehState,
    drive: &mut DriveErrorState,
    event: &ErrorEvent,
    now_ms: u64,
) -> Result<ActionFlags, DiehError> {
    let Some(record) = record else {
        let err = DiehError::MissingConfiguration;
        warn!(%err, "error event dropped");
        return Err(err);
    };

    let flags = event.error_flags;
    if let Some(actions) = short_circuit(flags) {
        trace!(?flags, ?actions, "short-circuit");
        return Ok(actions);
    }

    check_intervals(record, flags)?;

    let mut event = *event;
    let in_burst = now_ms.saturating_sub(drive.last_error_time) < record.burst_delta_ms;
    event.burst_weight_reduce = if in_burst {
        record.burst_weight_reduce
    } else {
        0
    };
    drive.last_error_time = now_ms;

    let frozen = event.is_emeh || dieh.is_emeh();
    let media_adjust = if frozen {
        WEIGHT_CHANGE_NONE
    } else {
        dieh.media_weight_adjust
    };
    if frozen && dieh.media_weight_adjust != WEIGHT_CHANGE_NONE {
        debug!(adjust = dieh.media_weight_adjust, "EMEH active, media weight adjustment frozen");
    }

    let mut actions = charge(record, ErrorCategory::Io, dieh, drive, &event, media_adjust)?;

    for (flag, category, multiplier) in CATEGORY_ROUTES {
        if !flags.contains(flag) {
            continue;
        }
        if ErrorFlags::LINK_PROOF_MASK.contains(flag) {
            *drive.error_tag_mut(ErrorCategory::Link) = 0;
        }
        let caller_multiplier = match multiplier {
            Multiplier::MediaAdjust => media_adjust,
            Multiplier::Unadjusted => WEIGHT_CHANGE_NONE,
        };
        actions |= charge(record, category, dieh, drive, &event, caller_multiplier)?;
    }

    for (error, action) in PASS_THROUGH {
        if flags.contains(error) {
            actions |= action;
        }
    }

    if record.reset_escalation == ResetEscalation::Legacy && actions.contains(ActionFlags::RESET) {
        actions.remove(ActionFlags::RESET);
        actions |= escalate_reset(record, drive)?;
    }

    if !actions.is_empty() {
        debug!(?flags, ?actions, io_counter = drive.io_counter, "error event handled");
    }
    Ok(actions)
}

fn short_circuit(flags: ErrorFlags) -> Option<ActionFlags> {
    if flags.is_empty() {
        Some(ActionFlags::NO_ACTION)
    } else if !flags.is_short_circuit() {
        None
    } else if flags.contains(ErrorFlags::PORT) {
        Some(ActionFlags::NO_ACTION)
    } else if flags.contains(ErrorFlags::FATAL) {
        Some(ActionFlags::FAIL)
    } else {
        // Only NOT_SPINNING is left in the mask.
        Some(ActionFlags::SPINUP)
    }
}

/// Reject the event up front if any category it reaches has no window.
fn check_intervals(record: &ThresholdRecord, flags: ErrorFlags) -> Result<(), DiehError> {
    let routed = CATEGORY_ROUTES
        .iter()
        .filter(|(flag, _, _)| flags.contains(*flag))
        .map(|&(_, category, _)| category);
    let legacy: &[ErrorCategory] = match record.reset_escalation {
        ResetEscalation::Legacy => &[ErrorCategory::Reset, ErrorCategory::PowerCycle],
        ResetEscalation::RuleTable => &[],
    };

    for category in std::iter::once(ErrorCategory::Io)
        .chain(routed)
        .chain(legacy.iter().copied())
    {
        if record.stat(category).interval == 0 {
            let err = DiehError::ZeroInterval { category };
            warn!(%err, "error event dropped");
            return Err(err);
        }
    }
    Ok(())
}

fn charge(
    record: &ThresholdRecord,
    category: ErrorCategory,
    dieh: &mut DiehState,
    drive: &mut DriveErrorState,
    event: &ErrorEvent,
    caller_multiplier: u32,
) -> Result<ActionFlags, DiehError> {
    let cfg = record.stat(category);
    let weight = effective_weight(cfg, cfg.weight, event, caller_multiplier);
    let io_counter = drive.io_counter;
    update_category(
        cfg,
        category,
        io_counter,
        drive.error_tag_mut(category),
        dieh.tripped_mut(category),
        weight,
    )
}
