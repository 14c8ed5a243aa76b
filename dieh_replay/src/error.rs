//! Error types for trace replay

use thiserror::Error;

use dieh_common::config::ConfigError;
use dieh_common::dieh::error::DiehError;

/// Errors that can occur while replaying a trace
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Configuration could not be loaded
    #[error("Configuration error: {source}")]
    Config {
        /// Source configuration error
        #[from]
        source: ConfigError,
    },

    /// Trace line is not a valid step
    #[error("Trace line {line}: {message}")]
    Parse {
        /// 1-based trace line
        line: usize,
        /// Parser message
        message: String,
    },

    /// Error flag name not known
    #[error("Trace line {line}: unknown error flag {name:?}")]
    UnknownFlag {
        /// 1-based trace line
        line: usize,
        /// Flag as written in the trace
        name: String,
    },

    /// Engine rejected the step
    #[error("Trace line {line}: {source}")]
    Engine {
        /// 1-based trace line
        line: usize,
        /// Source engine error
        #[source]
        source: DiehError,
    },

    /// Reading the trace or writing results failed
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Result could not be encoded
    #[error("Output encoding error: {source}")]
    Encode {
        /// Source JSON error
        #[from]
        source: serde_json::Error,
    },
}

impl ReplayError {
    /// Trace line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. } | Self::UnknownFlag { line, .. } | Self::Engine { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}
