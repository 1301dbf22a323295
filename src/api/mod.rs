//! # API Module
//!
//! HTTP endpoints of the short-lived local server started by `spotcache auth`.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the redirect from Spotify's authorization server,
//!   checks the `state` parameter and exchanges the authorization code for an
//!   access token using the stored PKCE code verifier.
//! - [`health`] - Returns status and version, handy to check that the callback
//!   server is reachable before authorizing.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use spotcache::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
