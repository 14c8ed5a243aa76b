//! Rule-table evaluation with latching and hysteresis.
//!
//! Bit *i* of a category's [`TrippedActions`] latches `rules[i]`. A latched
//! rule never re-emits its action; it re-arms only after the ratio has fallen
//! to or below its `reactivate_ratio`.
//!
//! Evaluation is two-phase:
//! 1. **Reactivation** against the ratio *before* the current error.
//! 2. **Trip** against the ratio *after* the current error, in table order.
//!
//! Several rules may fire in the same call; their flags are OR-ed.

use tracing::debug;

use dieh_common::dieh::category::TrippedActions;
use dieh_common::dieh::config::{ActionRule, StatConfig};
use dieh_common::dieh::flags::ActionFlags;

/// Release every latched rule whose reactivate ratio is at or above `ratio`.
///
/// Returns the bits that were released.
pub fn reactivate_rules(
    rules: &[ActionRule],
    tripped: &mut TrippedActions,
    ratio: u32,
) -> TrippedActions {
    let before = *tripped;
    for (i, rule) in rules.iter().enumerate() {
        let Some(reactivate) = rule.reactivate_ratio else {
            continue;
        };
        if ratio <= reactivate && tripped.is_tripped(i) {
            tripped.clear(i);
            debug!(index = i, action = ?rule.action, ratio, reactivate, "rule re-armed");
        }
    }
    TrippedActions::from_bits(before.bits() & !tripped.bits())
}

/// Reactivation pass alone, for periodic reassessment without a new error.
#[inline]
pub fn reactivate_action_flags(
    cfg: &StatConfig,
    tripped: &mut TrippedActions,
    ratio: u32,
) -> TrippedActions {
    reactivate_rules(&cfg.actions, tripped, ratio)
}

/// Run both passes and return the actions that fired.
pub fn evaluate(
    rules: &[ActionRule],
    tripped: &mut TrippedActions,
    prior_ratio: u32,
    new_ratio: u32,
) -> ActionFlags {
    reactivate_rules(rules, tripped, prior_ratio);

    let mut actions = ActionFlags::NO_ACTION;
    for (i, rule) in rules.iter().enumerate() {
        if tripped.is_tripped(i) || new_ratio < rule.ratio_threshold {
            continue;
        }
        tripped.trip(i);
        actions |= rule.action.flag();
        debug!(index = i, action = ?rule.action, ratio = new_ratio, threshold = rule.ratio_threshold, "rule tripped");
    }
    actions
}
