//! Error types for link resolution
//!
//! Provides a single error enum with human-readable messages
//! and string serialization for front-end consumption.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Stage of a decode chain that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    ShiftLetters,
    StripJunk,
    Base64,
    ShiftBytes,
    Reverse,
    InnerBase64,
    Json,
    Field,
}

impl DecodeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeStage::ShiftLetters => "shift_letters",
            DecodeStage::StripJunk => "strip_junk",
            DecodeStage::Base64 => "base64",
            DecodeStage::ShiftBytes => "shift_bytes",
            DecodeStage::Reverse => "reverse",
            DecodeStage::InnerBase64 => "inner_base64",
            DecodeStage::Json => "json",
            DecodeStage::Field => "field",
        }
    }
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for all resolution operations
///
/// Implements Display for human-readable messages and Serialize
/// so the CLI (or any other front-end) can emit it as a plain string.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Network failure, timeout or unreadable body
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Redirect chain exceeded the configured hop limit
    #[error("Too many redirects starting at {0}")]
    TooManyRedirects(String),

    /// Expected markup or pattern was absent
    #[error("Failed to parse page: {0}")]
    Parse(String),

    /// A cipher/encoding stage failed
    #[error("Decode failed at stage {stage}: {reason}")]
    Decode { stage: DecodeStage, reason: String },

    /// Provider-level failure with the step it happened in
    #[error("{provider} failed during {step}: {source}")]
    Extraction {
        provider: String,
        step: &'static str,
        #[source]
        source: Box<ResolveError>,
    },

    /// Provider name has no registered extractor
    #[error("Provider not supported: {0}")]
    NotSupported(String),

    /// Provider map was empty
    #[error("No streaming providers found")]
    NoProvidersFound,

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid provider name
    #[error("Invalid provider name: {0:?}")]
    InvalidProvider(String),
}

impl ResolveError {
    pub(crate) fn decode(stage: DecodeStage, reason: impl fmt::Display) -> Self {
        ResolveError::Decode {
            stage,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn extraction(provider: &str, step: &'static str, source: ResolveError) -> Self {
        ResolveError::Extraction {
            provider: provider.to_string(),
            step,
            source: Box::new(source),
        }
    }

    /// Innermost error, looking through `Extraction` wrappers
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::Extraction { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if retrying the whole resolution could succeed
    pub fn is_retryable(&self) -> bool {
        match self.root_cause() {
            ResolveError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ResolveError::Transport(e) => {
                // Retry on timeout, connection errors, or 5xx status codes
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            _ => false,
        }
    }
}

impl Serialize for ResolveError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;
