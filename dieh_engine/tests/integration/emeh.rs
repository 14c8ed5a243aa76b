//! Integration test: extended media error handling freeze.
//!
//! Under EMEH the media weight adjustment must not reach any category,
//! link accounting keeps running, and a media response still clears the
//! link tag.

use dieh_common::consts::WEIGHT_CHANGE_NONE;
use dieh_common::dieh::category::{DiehState, DriveErrorState, ErrorCategory};
use dieh_common::dieh::config::{ActionRule, StatConfig, ThresholdRecord};
use dieh_common::dieh::event::ErrorEvent;
use dieh_common::dieh::flags::{ActionFlags, ActionKind, ErrorFlags};

use dieh_engine::classify::handle_io_error;
use dieh_engine::lifecycle::{MediaThresholdCommand, apply_media_threshold};

// ─── Helpers ────────────────────────────────────────────────────────

/// Tag a single charge of `weight` produces from a stale category.
fn snapped(drive: &DriveErrorState, cfg: &StatConfig, weight: u64) -> u64 {
    drive.io_counter - cfg.interval + weight
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn media_event_under_emeh_uses_unadjusted_weights() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();
    dieh.media_weight_adjust = 40;

    *drive.error_tag_mut(ErrorCategory::Link) = drive.io_counter - 5;

    let ev = ErrorEvent::with_flags(ErrorFlags::MEDIA | ErrorFlags::HARDWARE).emeh(true);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000).unwrap();

    assert_eq!(
        drive.error_tag(ErrorCategory::Io),
        snapped(&drive, &record.io, record.io.weight)
    );
    assert_eq!(
        drive.error_tag(ErrorCategory::Media),
        snapped(&drive, &record.media, record.media.weight)
    );
    assert_eq!(
        drive.error_tag(ErrorCategory::Hardware),
        snapped(&drive, &record.hardware, record.hardware.weight)
    );
    assert_eq!(drive.error_tag(ErrorCategory::Link), 0);
}

#[test]
fn same_event_outside_emeh_is_adjusted() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();
    dieh.media_weight_adjust = 40;

    let ev = ErrorEvent::with_flags(ErrorFlags::MEDIA | ErrorFlags::HARDWARE);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000).unwrap();

    assert_eq!(
        drive.error_tag(ErrorCategory::Media),
        snapped(&drive, &record.media, record.media.weight * 40 / 100)
    );
    // Hardware never takes the media adjustment.
    assert_eq!(
        drive.error_tag(ErrorCategory::Hardware),
        snapped(&drive, &record.hardware, record.hardware.weight)
    );
}

#[test]
fn disable_command_activates_freeze() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    assert!(apply_media_threshold(
        &mut dieh,
        &mut drive,
        MediaThresholdCommand::Increase { percent: 100 }
    ));
    assert_eq!(dieh.media_weight_adjust, 50);
    assert!(apply_media_threshold(&mut dieh, &mut drive, MediaThresholdCommand::Disable));
    assert!(dieh.is_emeh());
    assert_eq!(dieh.media_weight_adjust, WEIGHT_CHANGE_NONE);

    // Event itself does not carry the EMEH bit: drive state decides.
    let ev = ErrorEvent::with_flags(ErrorFlags::RECOVERED);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000).unwrap();
    assert_eq!(
        drive.error_tag(ErrorCategory::Recovered),
        snapped(&drive, &record.recovered, record.recovered.weight)
    );
}

#[test]
fn link_still_fails_drive_under_emeh() {
    let mut record = ThresholdRecord::default();
    record.link = StatConfig::new(1000, 400).with_actions([
        ActionRule::new(50, Some(10), ActionKind::Reset),
        ActionRule::new(100, None, ActionKind::Fail),
    ]);
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();
    apply_media_threshold(&mut dieh, &mut drive, MediaThresholdCommand::Disable);

    let ev = ErrorEvent::with_flags(ErrorFlags::LINK).emeh(true);
    let mut seen = ActionFlags::NO_ACTION;
    for i in 0..4 {
        seen |= handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000 + i * 1_000).unwrap();
    }
    assert!(seen.contains(ActionFlags::RESET));
    assert!(seen.contains(ActionFlags::FAIL));
}

#[test]
fn health_check_and_data_under_emeh_use_unadjusted_weights() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();
    dieh.media_weight_adjust = 40;

    let ev = ErrorEvent::with_flags(ErrorFlags::HEALTH_CHECK | ErrorFlags::DATA).emeh(true);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000).unwrap();

    assert_eq!(
        drive.error_tag(ErrorCategory::HealthCheck),
        snapped(&drive, &record.health_check, record.health_check.weight)
    );
    assert_eq!(
        drive.error_tag(ErrorCategory::Data),
        snapped(&drive, &record.data, record.data.weight)
    );
}

#[test]
fn health_check_adjusted_and_data_not_outside_emeh() {
    let record = ThresholdRecord::default();
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();
    dieh.media_weight_adjust = 40;

    let ev = ErrorEvent::with_flags(ErrorFlags::HEALTH_CHECK | ErrorFlags::DATA);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000).unwrap();

    assert_eq!(
        drive.error_tag(ErrorCategory::HealthCheck),
        snapped(&drive, &record.health_check, record.health_check.weight * 40 / 100)
    );
    assert_eq!(
        drive.error_tag(ErrorCategory::Data),
        snapped(&drive, &record.data, record.data.weight)
    );
}
