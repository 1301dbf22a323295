//! # CLI Module
//!
//! User-facing commands of the `spotcache` binary. Each command builds a
//! [`Client`](crate::Client) from the stored authentication state, lets the
//! cache resolve what it needs (disk first, network otherwise) and prints the
//! result as a table.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the OAuth 2.0 PKCE flow and stores the token
//! - [`show`] - Prints the fields of any entity addressed by its identifier
//! - [`playlist`] - Lists the items of a playlist, optionally filtered by name
//! - [`me`] - Shows the current user's playlists or saved tracks
//! - [`search`] - Searches the catalog
//! - [`player`] - Controls playback on Spotify Connect devices
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotcache auth
//! spotcache show spotify:track:6rqhFgbbKwnb9MLmUQDhG6
//! spotcache playlist spotify:playlist:37i9dQZF1DXcBWIGoYBM5M --search love
//! spotcache me --tracks
//! spotcache search "daft punk" --type album,track --limit 5
//! spotcache player play --context spotify:album:4aawyAB9vmqN3uQ7FjRGTy --offset 2
//! spotcache player devices
//! ```
//!
//! Repeated invocations are served from the record directory, so only the
//! first run of a command touches the network.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Client, error};

mod auth;
mod me;
mod player;
mod playlist;
mod search;
mod show;

pub use auth::auth;
pub use me::me;
pub use player::{PlayerAction, player};
pub use playlist::playlist;
pub use search::search;
pub use show::show;

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub(crate) async fn connect() -> Client {
    match Client::connect().await {
        Ok(client) => client,
        Err(e) => error!("Cannot connect to Spotify. Err: {}", e),
    }
}
