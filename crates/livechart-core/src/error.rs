//! Error types.
//!
//! Only one failure is recoverable: a sample whose raw text is not a number
//! ([`SourceError::Format`]). The sampler skips that source for the tick.
//! Everything else ends the session.

use std::io;

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to obtain one value from a [`crate::ValueSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The raw input was read but could not be interpreted as a number.
    #[error("malformed sample from {source_id}: {raw:?} is not a number")]
    Format { source_id: String, raw: String },

    /// The input could not be opened or read at all.
    #[error("failed to read {source_id}: {source}")]
    Io {
        source_id: String,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    /// True for the per-tick recoverable kind.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

/// Top-level error for a charting session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal failure: {0}")]
    Terminal(#[from] io::Error),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to start sampler thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("sampler thread panicked")]
    SamplerPanicked,
}
