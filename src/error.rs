//! Crate-wide error taxonomy.
//!
//! Auth expiry is its own variant so session handling above this crate can
//! react to it without string matching; everything else a fetch can produce
//! collapses into transport/status failures that panels surface verbatim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadarError {
    /// The backend answered 401: the session is gone. Propagated upward
    /// untouched; this crate never retries or re-authenticates.
    #[error("session expired")]
    AuthExpired,

    /// The request never completed (DNS, connect, TLS, body read).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status other than 401.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// A payload failed to decode into the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// A rule update addressed a slot outside the working set.
    #[error("rule index {index} out of range (set has {len} rules)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<reqwest::Error> for RadarError {
    fn from(err: reqwest::Error) -> Self {
        RadarError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RadarError {
    fn from(err: serde_json::Error) -> Self {
        RadarError::Malformed(err.to_string())
    }
}
