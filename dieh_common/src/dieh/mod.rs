//! DIEH (drive improved error handling) shared types.
//!
//! Organized by domain: error/action bitflags, categories and persisted
//! drive state, threshold configuration, the per-I/O error event, and the
//! engine error taxonomy.

pub mod category;
pub mod config;
pub mod error;
pub mod event;
pub mod flags;
