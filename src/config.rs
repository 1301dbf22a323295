//! Configuration management for spotcache.
//!
//! Values are read from environment variables, which may be provided by a
//! `.env` file in the local data directory. Everything except the client id has
//! a default, so a minimal setup only needs `SPOTIFY_API_AUTH_CLIENT_ID`.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf};

use crate::{
    cache::CacheOptions,
    error::{Error, Result},
    spotify::fetch::MAX_PAGE,
};

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SCOPE: &str = "user-library-read playlist-read-private playlist-read-collaborative \
                             user-read-private user-read-playback-state user-modify-playback-state";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Value of `SPOTCACHE_CACHE_DIR` that turns the disk cache off.
pub const CACHE_DISABLED: &str = "off";

/// Directory holding the `.env` file, the authentication state and, by
/// default, the cache records.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotcache`
/// - macOS: `~/Library/Application Support/spotcache`
/// - Windows: `%LOCALAPPDATA%/spotcache`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotcache");
    path
}

/// Loads environment variables from `<data dir>/.env`.
///
/// A missing file is not an error; variables already present in the process
/// environment are never overwritten.
///
/// # Errors
///
/// Fails if the data directory cannot be created or the file exists but
/// cannot be parsed.
///
/// # Example
///
/// ```
/// use spotcache::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> std::result::Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id of the registered Spotify application (`SPOTIFY_API_AUTH_CLIENT_ID`).
///
/// # Errors
///
/// Returns [`Error::Config`] when the variable is not set.
pub fn spotify_client_id() -> Result<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()))
}

/// Client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// Optional: without it the PKCE flow is used and token refreshes send the
/// client id in the form body instead of Basic authentication.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// OAuth redirect URI (`SPOTIFY_API_REDIRECT_URI`). Must match the one
/// registered for the application.
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Space separated OAuth scopes (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Base URL of the Web API (`SPOTIFY_API_URL`), without a trailing slash.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Directory for cache records (`SPOTCACHE_CACHE_DIR`).
///
/// Defaults to `<data dir>/cache`; the value `off` disables disk caching.
pub fn cache_dir() -> Option<PathBuf> {
    parse_cache_dir(env::var("SPOTCACHE_CACHE_DIR").ok().as_deref())
}

/// Page size for paginated collections (`SPOTCACHE_PAGE_SIZE`), 50 by default.
pub fn page_size() -> u32 {
    parse_page_size(env::var("SPOTCACHE_PAGE_SIZE").ok().as_deref())
}

pub fn cache_options() -> CacheOptions {
    CacheOptions {
        cache_dir: cache_dir(),
        page_size: page_size(),
    }
}

/// Interprets a `SPOTCACHE_CACHE_DIR` value.
///
/// # Example
///
/// ```
/// use spotcache::config::parse_cache_dir;
///
/// assert_eq!(parse_cache_dir(Some("off")), None);
/// assert_eq!(parse_cache_dir(Some("/tmp/records")), Some("/tmp/records".into()));
/// ```
pub fn parse_cache_dir(value: Option<&str>) -> Option<PathBuf> {
    match value.map(str::trim) {
        None | Some("") => Some(data_dir().join("cache")),
        Some(value) if value.eq_ignore_ascii_case(CACHE_DISABLED) => None,
        Some(value) => Some(PathBuf::from(value)),
    }
}

/// Interprets a `SPOTCACHE_PAGE_SIZE` value, falling back to 50 when it is
/// missing or not a positive number. Values above 50 are kept; collection
/// endpoints clamp them to their own maximum.
pub fn parse_page_size(value: Option<&str>) -> u32 {
    value
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|size| *size > 0)
        .unwrap_or(MAX_PAGE)
}
