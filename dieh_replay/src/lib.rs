//! # DIEH Replay Library
//!
//! Replays recorded I/O completion traces through the DIEH engine for one
//! simulated drive and reports every decision.
//!
//! # Module Structure
//!
//! - [`trace`] - JSON-lines trace format
//! - [`replayer`] - Drive simulation and result output
//! - [`error`] - Replay error type
//!
//! # Data Flow
//!
//! ```text
//! trace.jsonl ──► parse_line ──► Replayer::apply ──► StepOutcome ──► stdout (JSON lines)
//!                                    │
//!                                    ▼
//!                      dieh_engine (classify / lifecycle)
//! ```

pub mod error;
pub mod replayer;
pub mod trace;
