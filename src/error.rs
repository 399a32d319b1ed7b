//! Error taxonomy for the shortening protocol.
//!
//! One tagged enum instead of stringly-typed failures: callers match
//! exhaustively, and the HTTP status travels as data so a 429 from the
//! storage service can be surfaced as "rate limited, try later" rather
//! than a generic error. "No such record" is deliberately NOT a variant;
//! lookups return `Ok(None)` so an absent record can never be confused
//! with a URL that decrypts to an empty string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Identifier fails length or alphabet validation. Rejected before
    /// any network call is made.
    #[error("malformed identifier: {reason}")]
    MalformedIdentifier { reason: &'static str },

    /// The secret segment of a short link fails decoding.
    #[error("malformed secret segment")]
    MalformedSecret,

    /// A stored record cannot be decoded.
    #[error("malformed stored record: {reason}")]
    MalformedRecord { reason: &'static str },

    /// Key derivation received inputs of the wrong length, or the KDF
    /// itself rejected its parameters.
    #[error("key derivation failed: {reason}")]
    KeyDerivation { reason: &'static str },

    /// Ciphertext failed its integrity check: wrong password, wrong
    /// nonce, or tampering.
    #[error("authentication failed: wrong secret or tampered record")]
    Authentication,

    /// The storage service answered with a failure status.
    #[error("storage service returned status {status}")]
    Transport { status: u16 },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
}

impl Error {
    /// True when the storage service asked us to back off (HTTP 429).
    /// Callers must surface this as a retry-later condition, not a
    /// generic failure.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Transport { status: 429 })
    }

    /// HTTP status carried by a transport failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status } => Some(*status),
            _ => None,
        }
    }

    /// Codec and derivation errors are permanent: retrying with the
    /// same input cannot succeed.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, Self::Transport { .. } | Self::Network(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
