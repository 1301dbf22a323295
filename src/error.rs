//! Error taxonomy shared by the cache, the entities and the transport.
//!
//! Errors fall into three groups:
//!
//! - **Identifier errors** (`MalformedIdentifier`, `TypeMismatch`) are fatal to
//!   the caller and never retried.
//! - **Staleness errors** (`DataShape`, `ElementOutdated`) are raised while
//!   applying a record to an entity. [`crate::cache::Cache::load`] reacts to them
//!   with exactly one forced network fetch before giving up.
//! - **Transport errors** mirror the HTTP status codes of the Web API and are
//!   propagated verbatim. `RateLimited` is handled inside the transport.

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed identifier '{0}'")]
    MalformedIdentifier(String),

    #[error("identifier {uri} does not describe a {expected}")]
    TypeMismatch { uri: String, expected: &'static str },

    /// A response or cache record is missing an expected field.
    #[error("unexpected data shape: {0}")]
    DataShape(String),

    /// The record describes another resource than the entity it was loaded into.
    #[error("record for {found} cannot be applied to {expected}")]
    ElementOutdated { expected: String, found: String },

    #[error("not modified: {0}")]
    NotModified(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal server error: {0}")]
    InternalServerError(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// An entity outlived the cache that created it.
    #[error("the owning cache has been dropped")]
    CacheDropped,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps an HTTP status code and response body to a transport error.
    ///
    /// Returns `None` for statuses that are not errors at this layer.
    pub fn from_status(status: u16, body: impl Into<String>) -> Option<Self> {
        let body = body.into();
        match status {
            304 => Some(Self::NotModified(body)),
            400 => Some(Self::BadRequest(body)),
            401 => Some(Self::InvalidToken(body)),
            403 => Some(Self::Forbidden(body)),
            404 => Some(Self::NotFound(body)),
            429 => Some(Self::RateLimited),
            500..=599 => Some(Self::InternalServerError(body)),
            _ => None,
        }
    }

    /// True for errors that mean the applied record is stale or incomplete.
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::DataShape(_) | Error::ElementOutdated { .. })
    }
}
