//! Integration test: bit-exact ratio trace with trip and reactivation.
//!
//! `interval = 1000`, `weight = 50`, one rule `{ratio 50, reactivate 10, RESET}`.
//! The drive starts at `io_counter = 2000` with a zero tag, takes one error,
//! then one error every 10 I/Os. Values below include the truncation of
//! every `f64` intermediate.

use dieh_common::dieh::category::{ErrorCategory, TrippedActions};
use dieh_common::dieh::config::{ActionRule, StatConfig};
use dieh_common::dieh::flags::{ActionFlags, ActionKind};

use dieh_engine::classify::update_category;
use dieh_engine::ratio::{apply_error, compute_ratio};

const CAT: ErrorCategory = ErrorCategory::Io;

// ─── Helpers ────────────────────────────────────────────────────────

fn config() -> StatConfig {
    StatConfig::new(1000, 50).with_actions([ActionRule::new(50, Some(10), ActionKind::Reset)])
}

/// (io_counter, prior ratio, new tag, new ratio) after each 10-I/O step.
const TRACE: [(u64, u32, u64, u32); 25] = [
    (2010, 4, 1109, 9),
    (2020, 8, 1159, 13),
    (2030, 12, 1209, 17),
    (2040, 16, 1259, 21),
    (2050, 20, 1309, 25),
    (2060, 24, 1359, 29),
    (2070, 28, 1409, 33),
    (2080, 32, 1459, 37),
    (2090, 36, 1509, 41),
    (2100, 40, 1559, 45),
    (2110, 44, 1609, 49),
    (2120, 48, 1659, 53),
    (2130, 52, 1709, 57),
    (2140, 56, 1759, 61),
    (2150, 60, 1809, 65),
    (2160, 64, 1859, 69),
    (2170, 68, 1909, 73),
    (2180, 72, 1959, 77),
    (2190, 76, 2009, 81),
    (2200, 80, 2059, 85),
    (2210, 84, 2109, 89),
    (2220, 88, 2159, 93),
    (2230, 92, 2209, 97),
    (2240, 96, 2240, 100),
    (2250, 99, 2250, 100),
];

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn first_error_lands_in_transitional_band() {
    let cfg = config();
    assert_eq!(compute_ratio(&cfg, CAT, 2000, 0).unwrap(), 0);
    let tag = apply_error(&cfg, CAT, 2000, 0, 50).unwrap();
    assert_eq!(tag, 1050);
    assert_eq!(compute_ratio(&cfg, CAT, 2000, tag).unwrap(), 5);
}

#[test]
fn trace_matches_bit_for_bit() {
    let cfg = config();
    let mut tag = apply_error(&cfg, CAT, 2000, 0, 50).unwrap();

    for (step, &(io, prior, expected_tag, expected_ratio)) in TRACE.iter().enumerate() {
        assert_eq!(compute_ratio(&cfg, CAT, io, tag).unwrap(), prior, "prior ratio, step {}", step + 1);
        tag = apply_error(&cfg, CAT, io, tag, 50).unwrap();
        assert_eq!(tag, expected_tag, "tag, step {}", step + 1);
        assert_eq!(compute_ratio(&cfg, CAT, io, tag).unwrap(), expected_ratio, "ratio, step {}", step + 1);
    }
}

#[test]
fn reset_fires_once_at_step_12_then_rearms() {
    let cfg = config();
    let mut tag = 0;
    let mut tripped = TrippedActions::NONE;

    let first = update_category(&cfg, CAT, 2000, &mut tag, &mut tripped, 50).unwrap();
    assert_eq!(first, ActionFlags::NO_ACTION);

    let mut fired_at = Vec::new();
    for (step, &(io, _, _, _)) in TRACE.iter().enumerate() {
        let actions = update_category(&cfg, CAT, io, &mut tag, &mut tripped, 50).unwrap();
        if actions.contains(ActionFlags::RESET) {
            fired_at.push(step + 1);
        }
    }
    assert_eq!(fired_at, vec![12]);
    assert!(tripped.is_tripped(0));
    assert_eq!(tag, 2250);

    // 890 quiet I/Os later the ratio is still 11: latched.
    assert_eq!(compute_ratio(&cfg, CAT, 3140, tag).unwrap(), 11);
    // 891 quiet I/Os: ratio 10, the next error re-arms the rule.
    assert_eq!(compute_ratio(&cfg, CAT, 3141, tag).unwrap(), 10);
    let rearm = update_category(&cfg, CAT, 3141, &mut tag, &mut tripped, 50).unwrap();
    assert_eq!(rearm, ActionFlags::NO_ACTION);
    assert_eq!(tag, 2300);
    assert!(!tripped.is_tripped(0));

    // Ninth error after re-arming crosses 50 again (ratio 51).
    let mut io = 3141;
    for step in 1..=9 {
        io += 10;
        let actions = update_category(&cfg, CAT, io, &mut tag, &mut tripped, 50).unwrap();
        if step < 9 {
            assert_eq!(actions, ActionFlags::NO_ACTION, "step {step}");
        } else {
            assert_eq!(actions, ActionFlags::RESET);
        }
    }
    assert_eq!(tag, 2750);
    assert_eq!(compute_ratio(&cfg, CAT, io, tag).unwrap(), 51);
}

#[test]
fn without_reactivate_rule_stays_latched() {
    let cfg = StatConfig::new(1000, 50).with_actions([ActionRule::new(50, None, ActionKind::Event)]);
    let mut tag = 0;
    let mut tripped = TrippedActions::NONE;
    let mut fired = 0;

    update_category(&cfg, CAT, 2000, &mut tag, &mut tripped, 50).unwrap();
    for &(io, _, _, _) in &TRACE {
        if !update_category(&cfg, CAT, io, &mut tag, &mut tripped, 50).unwrap().is_empty() {
            fired += 1;
        }
    }
    // Long quiet period, then the same burst again.
    let offset = 1_000_000;
    tag = apply_error(&cfg, CAT, 2000 + offset, tag, 50).unwrap();
    for &(io, _, _, _) in &TRACE {
        if !update_category(&cfg, CAT, io + offset, &mut tag, &mut tripped, 50).unwrap().is_empty() {
            fired += 1;
        }
    }
    assert_eq!(fired, 1);
}
