//! DIEH Common Library
//!
//! Shared constants, configuration loading and data types for the drive
//! improved error handling workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Numeric limits and defaults
//! - [`config`] - Configuration loading traits and types
//! - [`dieh`] - Flags, categories, drive state and threshold records
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use dieh_common::prelude::*;
//!
//! let record = ThresholdRecord::default();
//! let drive = DriveErrorState::new();
//! assert!(record.validate().is_ok());
//! assert_eq!(drive.io_counter, INITIAL_IO_COUNTER);
//! ```

pub mod config;
pub mod consts;
pub mod dieh;
pub mod prelude;
