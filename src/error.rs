//! Error types.
//!
//! Two layers:
//!
//! - [`FeedError`]: cycle-level failures of the fetch/parse pipeline
//!   (fetch, unrecognized payload shape, zero valid observations).
//! - [`AppError`]: what the binary reports, carrying a process exit code.
//!
//! Per-observation failures ([`crate::time::ParseError`]) never reach either
//! type; the feed parser absorbs them.

use thiserror::Error;

/// Exit code for usage/configuration/export problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code when the feed parsed but yielded no valid observations.
pub const EXIT_NO_DATA: u8 = 3;
/// Exit code for fetch/format failures with demo fallback disabled.
pub const EXIT_FEED: u8 = 4;

/// Failure of one fetch/parse cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Network, transport, timeout, HTTP status or body decoding failure.
    #[error("Error fetching data: {0}")]
    Fetch(String),

    /// The top-level payload shape was not recognized.
    #[error("Unexpected data format: {0}")]
    Format(String),

    /// Parsing succeeded structurally but no item produced a valid observation.
    #[error("No valid data points found. Processed {items_considered} items.")]
    EmptyResult { items_considered: usize },
}

impl FeedError {
    /// Fetch and format failures may be recovered with demo data; an empty
    /// result is a degraded-data condition reported as-is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedError::Fetch(_) | FeedError::Format(_))
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        let code = match err {
            FeedError::EmptyResult { .. } => EXIT_NO_DATA,
            FeedError::Fetch(_) | FeedError::Format(_) => EXIT_FEED,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
