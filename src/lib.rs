//! Lazy-loading object cache for the Spotify Web API.
//!
//! Every Spotify resource (track, album, artist, episode, show, playlist,
//! user) is represented by exactly one in-memory entity per identifier. Entities
//! are created as empty shells and populated on first access, from a JSON
//! record on disk when one exists or from the Web API otherwise. Freshly
//! fetched data is written back so later runs start warm.
//!
//! # Modules
//!
//! - `cache` - Identity map, load protocol and disk records
//! - `entities` - The cacheable resource types
//! - `client` - String based lookups and search on top of the cache
//! - `playback` - Spotify Connect player control
//! - `spotify` - Transport trait, HTTP connection, pagination and OAuth
//! - `management` - Persisted authentication state
//! - `uri` - `spotify:<type>:<id>` identifiers
//! - `api`, `server` - Local callback server for the OAuth flow
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration from environment variables
//! - `types` - Wire records and table rows
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotcache::Client;
//!
//! #[tokio::main]
//! async fn main() -> spotcache::Res<()> {
//!     let client = Client::connect().await?;
//!     let track = client.track("spotify:track:6rqhFgbbKwnb9MLmUQDhG6")?;
//!     println!("{}", track.name().await?);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod management;
pub mod playback;
pub mod server;
pub mod spotify;
pub mod types;
pub mod uri;
pub mod utils;

pub use cache::{Cache, CacheOptions};
pub use client::Client;
pub use entities::{Element, Playable};
pub use error::{Error, Result};
pub use playback::{PlayRequest, Playback};
pub use uri::{ResourceType, Uri};

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use spotcache::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Loaded {} items", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Cached {} records", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Browser could not be opened");
/// warning!("Skipped {} unavailable items", skipped);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
