//! # Spotify Integration Module
//!
//! This module is the boundary between the object cache and the Spotify Web
//! API. The cache never talks HTTP itself: it consumes the [`Transport`]
//! capability, which issues authenticated requests and maps HTTP status codes
//! to [`crate::error::Error`] variants.
//!
//! ## Architecture
//!
//! ```text
//! Cache / Entities
//!          ↓
//! Fetch descriptors (fetch)      ← pure descriptions + pagination executor
//!          ↓
//! Transport trait
//!          ↓
//! Connection (reqwest, bearer token, retry on 429/502/503)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`connection`] - The reqwest based [`Transport`] implementation. Handles
//!   token refresh, status mapping and rate limiting.
//! - [`fetch`] - [`fetch::FetchRequest`] descriptors built by every entity and
//!   the executor that follows pagination until a page has no `next`.
//! - [`auth`] - OAuth 2.0 authorization code flow with PKCE and token refresh.
//!
//! ## Error Handling
//!
//! | Status | Outcome |
//! |--------|---------|
//! | 204 | `Ok(None)` |
//! | 304 | `NotModified` |
//! | 400 | `BadRequest` |
//! | 401 | token refreshed and request retried once if expired, else `InvalidToken` |
//! | 403 | `Forbidden` |
//! | 404 | `NotFound` |
//! | 429 | waits for `Retry-After` (or 5 seconds) and retries, never surfaced |
//! | 500 | `InternalServerError` |
//! | 502/503 | one retry after a second, then `InternalServerError` |
//!
//! ## Testing
//!
//! Because the cache only sees the trait, tests plug in a scripted transport
//! and count the calls made through it.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::Result;

pub mod auth;
pub mod connection;
pub mod fetch;

/// Authenticated request capability consumed by the cache.
///
/// `endpoint` is relative to the API base URL and may carry a query string,
/// e.g. `tracks/abc123` or `me/playlists?offset=0&limit=50`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>>;
}
