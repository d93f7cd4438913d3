//! Common types and utilities shared across tweetie crates.
//!
//! This crate carries the error taxonomy every pipeline stage reports through and
//! the observability helpers binaries use to install `tracing`. It stays light so
//! every other crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`TweetieError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! Deciding whether a failure should abort a whole batch:
//!
//! ```rust
//! use tweetie_common::TweetieError;
//!
//! let missing = TweetieError::NotFound("user_id=20".into());
//! assert!(!missing.is_fatal());
//!
//! let denied = TweetieError::Auth("invalid or expired token".into());
//! assert!(denied.is_fatal());
//! ```
use std::time::Duration;

pub mod observability;

/// Error types used across the tweetie pipeline.
#[derive(thiserror::Error, Debug)]
pub enum TweetieError {
    /// Credentials were rejected, missing, or expired. Never retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The requested handle or identifier does not exist or is inaccessible.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote service throttled the caller.
    ///
    /// `attempts` counts the calls made before giving up; `retry_after` is the
    /// server's wait hint when one was supplied.
    #[error("rate limited after {attempts} attempt(s)")]
    RateLimited {
        retry_after: Option<Duration>,
        attempts: u32,
    },

    /// An entity sub-field of a raw post was absent or ill-shaped.
    ///
    /// Extraction recovers from this locally; it never leaves the extractor.
    #[error("malformed entity field `{field}`: {reason}")]
    MalformedEntity { field: &'static str, reason: String },

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Network failures and unexpected server statuses.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller cancelled the operation, possibly while it waited out a backoff.
    #[error("operation cancelled")]
    Cancelled,
}

impl TweetieError {
    /// Whether this error must abort the whole operation rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TweetieError::Auth(_) | TweetieError::RateLimited { .. } | TweetieError::Cancelled
        )
    }
}

/// Convenient alias for results that use [`TweetieError`].
pub type Result<T> = std::result::Result<T, TweetieError>;
