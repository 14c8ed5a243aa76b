//! Integration test: legacy reset escalation through the dispatcher.
//!
//! A link rule requests a reset on every burst. With legacy escalation
//! selected each reset request is judged against the reset and power-cycle
//! budgets, and each completed reset is charged to the reset category:
//! reset ×3 → reset with end of life (power-cycle budget consumed) → fail.

use dieh_common::dieh::category::{DiehState, DriveErrorState, ErrorCategory};
use dieh_common::dieh::config::{
    ActionRule, LegacyControl, ResetEscalation, StatConfig, ThresholdRecord,
};
use dieh_common::dieh::event::ErrorEvent;
use dieh_common::dieh::flags::{ActionFlags, ActionKind, ErrorFlags};

use dieh_engine::classify::handle_io_error;
use dieh_engine::lifecycle::reset_completed;

// ─── Helpers ────────────────────────────────────────────────────────

fn legacy_record() -> ThresholdRecord {
    ThresholdRecord {
        link: StatConfig::new(1000, 600)
            .with_actions([ActionRule::new(50, Some(10), ActionKind::Reset)]),
        reset_escalation: ResetEscalation::Legacy,
        legacy_control: LegacyControl {
            fail_call_home: true,
            end_of_life: true,
            end_of_life_call_home: false,
        },
        ..ThresholdRecord::default()
    }
}

/// One cycle: quiet I/Os, a link error, and the reset the caller performs.
fn cycle(
    record: &ThresholdRecord,
    dieh: &mut DiehState,
    drive: &mut DriveErrorState,
    now_ms: u64,
) -> ActionFlags {
    drive.record_successes(5_000);
    let ev = ErrorEvent::with_flags(ErrorFlags::LINK);
    let actions = handle_io_error(Some(record), dieh, drive, &ev, now_ms).unwrap();
    if actions.contains(ActionFlags::RESET) {
        reset_completed(Some(record), drive).unwrap();
    }
    dieh.filter_call_home(actions)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn reset_power_cycle_fail_sequence() {
    let record = legacy_record();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    let outcomes: Vec<ActionFlags> = (0..6)
        .map(|i| cycle(&record, &mut dieh, &mut drive, 10_000 * (i + 1)))
        .collect();

    assert_eq!(
        outcomes,
        vec![
            ActionFlags::RESET,
            ActionFlags::RESET,
            ActionFlags::RESET,
            ActionFlags::RESET | ActionFlags::END_OF_LIFE,
            ActionFlags::FAIL | ActionFlags::FAIL_CALL_HOME,
            // Call home is emitted once.
            ActionFlags::FAIL,
        ]
    );
    assert!(dieh.kill_call_home_sent);
}

#[test]
fn power_cycle_tag_set_on_first_breach() {
    let record = legacy_record();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    for i in 0..3 {
        cycle(&record, &mut dieh, &mut drive, 10_000 * (i + 1));
    }
    assert_eq!(drive.error_tag(ErrorCategory::PowerCycle), 0);

    cycle(&record, &mut dieh, &mut drive, 40_000);
    assert_eq!(drive.error_tag(ErrorCategory::PowerCycle), drive.io_counter);
}

#[test]
fn rule_table_mode_returns_plain_reset() {
    let record = ThresholdRecord {
        reset_escalation: ResetEscalation::RuleTable,
        ..legacy_record()
    };
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    for i in 0..6 {
        let actions = cycle(&record, &mut dieh, &mut drive, 10_000 * (i + 1));
        assert_eq!(actions, ActionFlags::RESET, "cycle {i}");
    }
}
