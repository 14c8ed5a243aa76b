//! Per-event weight computation.
//!
//! The debt charged for one error starts from the category base weight,
//! loses the burst discount, then is scaled by every matching weight
//! exception and finally by the caller multiplier:
//!
//! ```text
//! real   = base − base·burst/100
//! change = NONE ∘ opcode ∘ port ∘ sense ∘ caller      (∘ = calculate_new_weight_change)
//! weight = real·change/100
//! ```
//!
//! The burst discount is subtracted from the base before any multiplier is
//! applied; swapping the order changes the result.

use tracing::trace;

use dieh_common::consts::WEIGHT_CHANGE_NONE;
use dieh_common::dieh::config::{ExceptionCode, StatConfig, WeightException};
use dieh_common::dieh::event::ErrorEvent;

/// Fold `adjust_by` [%] into the running multiplier `current` [%].
///
/// [`WEIGHT_CHANGE_NONE`] is the identity on either side.
#[inline]
pub fn calculate_new_weight_change(current: u32, adjust_by: u32) -> u32 {
    if adjust_by == WEIGHT_CHANGE_NONE {
        return current;
    }
    let combined = u64::from(current) * u64::from(adjust_by) / 100;
    u32::try_from(combined).unwrap_or(u32::MAX)
}

// ─── Exception Lookup ───────────────────────────────────────────────
//
// Each kind is looked up independently; the first matching entry of that
// kind wins.

/// Change [%] of the first opcode exception matching `opcode`.
pub fn opcode_change(exceptions: &[WeightException], opcode: u8) -> u32 {
    exceptions
        .iter()
        .find_map(|wtx| match wtx.code {
            ExceptionCode::Opcode { opcode: op } if op == opcode => Some(wtx.change_percent),
            _ => None,
        })
        .unwrap_or(WEIGHT_CHANGE_NONE)
}

/// Change [%] of the first port exception matching `port_status`.
pub fn port_change(exceptions: &[WeightException], port_status: u32) -> u32 {
    exceptions
        .iter()
        .find_map(|wtx| match wtx.code {
            ExceptionCode::PortError { port_status: ps } if ps == port_status => {
                Some(wtx.change_percent)
            }
            _ => None,
        })
        .unwrap_or(WEIGHT_CHANGE_NONE)
}

/// Change [%] of the first sense-code range containing `(key, asc, ascq)`.
pub fn sense_change(exceptions: &[WeightException], key: u8, asc: u8, ascq: u8) -> u32 {
    exceptions
        .iter()
        .find_map(|wtx| match wtx.code {
            ExceptionCode::SenseCode(range) if range.matches(key, asc, ascq) => {
                Some(wtx.change_percent)
            }
            _ => None,
        })
        .unwrap_or(WEIGHT_CHANGE_NONE)
}

// ─── Effective Weight ───────────────────────────────────────────────

/// Debt [I/Os] one `event` adds to a category configured by `cfg`.
///
/// `caller_multiplier` is the media weight adjustment for media-related
/// categories, or [`WEIGHT_CHANGE_NONE`] when frozen or not applicable.
pub fn effective_weight(
    cfg: &StatConfig,
    base_weight: u64,
    event: &ErrorEvent,
    caller_multiplier: u32,
) -> u64 {
    let burst = u128::from(event.burst_weight_reduce.min(100));
    let base = u128::from(base_weight);
    let real_weight = base - base * burst / 100;

    let table = cfg.weight_exceptions.as_slice();
    let mut change = WEIGHT_CHANGE_NONE;
    change = calculate_new_weight_change(change, opcode_change(table, event.opcode));
    change = calculate_new_weight_change(change, port_change(table, event.port_status));
    change = calculate_new_weight_change(
        change,
        sense_change(table, event.sense_key, event.asc, event.ascq),
    );
    change = calculate_new_weight_change(change, caller_multiplier);

    if change == WEIGHT_CHANGE_NONE {
        return real_weight as u64;
    }

    let weight = real_weight * u128::from(change) / 100;
    trace!(base_weight, burst = event.burst_weight_reduce, change, weight = %weight, "weight adjusted");
    u64::try_from(weight).unwrap_or(u64::MAX)
}
