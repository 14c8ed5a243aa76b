//! Integration test: drive lifecycle around error handling.
//!
//! Clear drops error debt but keeps latches; a fresh drive never reads as
//! having recent errors; periodic reactivation re-arms idle categories.

use dieh_common::consts::INITIAL_IO_COUNTER;
use dieh_common::dieh::category::{DiehState, DriveErrorState, ErrorCategory};
use dieh_common::dieh::config::ThresholdRecord;
use dieh_common::dieh::event::ErrorEvent;
use dieh_common::dieh::flags::{ActionFlags, ErrorFlags};

use dieh_engine::classify::handle_io_error;
use dieh_engine::lifecycle::{clear_drive, init_drive, reactivate_drive};
use dieh_engine::report::DiehReport;

// ─── Helpers ────────────────────────────────────────────────────────

/// Hardware errors until the reset rule fires.
fn drive_to_reset(record: &ThresholdRecord, dieh: &mut DiehState, drive: &mut DriveErrorState) {
    let ev = ErrorEvent::with_flags(ErrorFlags::HARDWARE);
    for i in 0..20 {
        let actions = handle_io_error(Some(record), dieh, drive, &ev, 1_000 * (i + 1)).unwrap();
        if actions.contains(ActionFlags::RESET) {
            return;
        }
    }
    panic!("reset rule never fired");
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn fresh_drive_has_zero_ratios() {
    let mut drive = DriveErrorState::default();
    init_drive(&mut drive);
    assert_eq!(drive.io_counter, INITIAL_IO_COUNTER);
    let report = DiehReport::collect(&ThresholdRecord::default(), &drive, &DiehState::new());
    assert_eq!(report.max_ratio(), 0);
}

#[test]
fn clear_keeps_latch_so_rule_does_not_refire_immediately() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    drive_to_reset(&record, &mut dieh, &mut drive);
    assert!(dieh.tripped(ErrorCategory::Hardware).is_tripped(0));

    clear_drive(&mut drive);
    assert_eq!(drive.error_tag(ErrorCategory::Hardware), 0);
    assert!(dieh.tripped(ErrorCategory::Hardware).is_tripped(0));

    // First error after clear: prior ratio 0 re-arms, ratio stays low.
    let ev = ErrorEvent::with_flags(ErrorFlags::HARDWARE);
    let actions = handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 100_000).unwrap();
    assert!(!actions.contains(ActionFlags::RESET));
    assert!(!dieh.tripped(ErrorCategory::Hardware).is_tripped(0));
}

#[test]
fn periodic_reactivation_after_quiet_period() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    drive_to_reset(&record, &mut dieh, &mut drive);

    // Still hot: nothing re-arms.
    reactivate_drive(&record, &mut dieh, &drive);
    assert!(dieh.tripped(ErrorCategory::Hardware).is_tripped(0));

    // Two full windows of clean I/O.
    drive.record_successes(2 * record.hardware.interval + 1);
    reactivate_drive(&record, &mut dieh, &drive);
    assert!(!dieh.tripped(ErrorCategory::Hardware).is_tripped(0));

    let report = DiehReport::collect(&record, &drive, &dieh);
    assert_eq!(report.get(ErrorCategory::Hardware).ratio, 0);
}
