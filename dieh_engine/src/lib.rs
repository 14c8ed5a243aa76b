//! # DIEH Engine Library
//!
//! Decision core of drive improved error handling. Turns per-I/O error
//! events into graded recovery actions (reset, spin-up, end of life, fail,
//! call home) from decaying per-category error ratios.
//!
//! ## Components
//!
//! 1. [`ratio`] - decaying error tag and its 0–100 ratio
//! 2. [`weight`] - burst discount and multiplicative weight overrides
//! 3. [`action`] - latching rule tables with reactivation hysteresis
//! 4. [`classify`] - completion-path dispatcher over all categories
//! 5. [`legacy`] - reset → power cycle → fail escalation
//! 6. [`lifecycle`] - drive state init/clear/reset, media threshold commands
//!
//! ## Completion Path
//!
//! Every entry point is synchronous, allocation-free and bounded by the
//! rule (≤32) and exception (≤20) table sizes. The engine keeps no state of
//! its own: callers pass the drive's [`DriveErrorState`] and [`DiehState`]
//! and must serialize calls per drive.
//!
//! ```rust
//! use dieh_common::prelude::*;
//! use dieh_engine::classify::handle_io_error;
//!
//! let record = ThresholdRecord::default();
//! let mut dieh = DiehState::new();
//! let mut drive = DriveErrorState::new();
//!
//! let event = ErrorEvent::with_flags(ErrorFlags::FATAL);
//! let actions = handle_io_error(Some(&record), &mut dieh, &mut drive, &event, 0)?;
//! assert_eq!(actions, ActionFlags::FAIL);
//! # Ok::<(), DiehError>(())
//! ```
//!
//! [`DriveErrorState`]: dieh_common::dieh::category::DriveErrorState
//! [`DiehState`]: dieh_common::dieh::category::DiehState

pub mod action;
pub mod classify;
pub mod config;
pub mod legacy;
pub mod lifecycle;
pub mod ratio;
pub mod report;
pub mod weight;
