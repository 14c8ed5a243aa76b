//! Integration test: weight exceptions through the dispatcher.

use dieh_common::consts::WEIGHT_CHANGE_NONE;
use dieh_common::dieh::category::{DiehState, DriveErrorState, ErrorCategory};
use dieh_common::dieh::config::{
    ExceptionCode, SenseCodeRange, StatConfig, ThresholdRecord, WeightException,
};
use dieh_common::dieh::event::ErrorEvent;
use dieh_common::dieh::flags::ErrorFlags;

use dieh_engine::classify::handle_io_error;
use dieh_engine::weight::effective_weight;

#[test]
fn opcode_exception_example() {
    let cfg = StatConfig::new(1000, 100)
        .with_exceptions([WeightException::new(ExceptionCode::Opcode { opcode: 0x88 }, 50)]);
    let ev = ErrorEvent::with_flags(ErrorFlags::MEDIA).opcode(0x88);
    assert_eq!(effective_weight(&cfg, 100, &ev, WEIGHT_CHANGE_NONE), 50);
}

#[test]
fn media_sense_exception_doubles_charge() {
    let mut record = ThresholdRecord::default();
    record.media = record.media.clone().with_exceptions([WeightException::new(
        ExceptionCode::SenseCode(SenseCodeRange::from_packed(0x0311_00FF)),
        200,
    )]);
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    let ev = ErrorEvent::with_flags(ErrorFlags::MEDIA).sense(0x03, 0x11, 0x04);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_000).unwrap();

    let io = drive.io_counter;
    assert_eq!(
        drive.error_tag(ErrorCategory::Media),
        io - record.media.interval + 2 * record.media.weight
    );
    // The io category has no exceptions of its own.
    assert_eq!(
        drive.error_tag(ErrorCategory::Io),
        io - record.io.interval + record.io.weight
    );
}

#[test]
fn exception_and_burst_combine() {
    let mut record = ThresholdRecord::default();
    record.hardware = record
        .hardware
        .clone()
        .with_exceptions([WeightException::new(ExceptionCode::PortError { port_status: 4 }, 50)]);
    let mut dieh = DiehState::new();
    let mut drive = DriveErrorState::new();

    // Full weight first so the tag sits in the active region.
    let plain = ErrorEvent::with_flags(ErrorFlags::HARDWARE);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &plain, 10_000).unwrap();
    let first = drive.error_tag(ErrorCategory::Hardware);
    assert_eq!(first, drive.io_counter - record.hardware.interval + 36_000);

    // 50 ms later: 20 % burst discount, then the 50 % exception.
    let ev = ErrorEvent::with_flags(ErrorFlags::HARDWARE).port_status(4);
    handle_io_error(Some(&record), &mut dieh, &mut drive, &ev, 10_050).unwrap();
    assert_eq!(drive.error_tag(ErrorCategory::Hardware) - first, 14_400);
}
