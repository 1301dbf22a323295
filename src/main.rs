use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use spotcache::{cli, config, error, types::PkceToken, utils};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Show the fields of any entity, e.g. spotify:track:6rqhFgbbKwnb9MLmUQDhG6
    Show(ShowOptions),

    /// List the items of a playlist
    Playlist(PlaylistOptions),

    /// Show your playlists or saved tracks
    Me(MeOptions),

    /// Search the catalog
    Search(SearchOptions),

    /// Control playback on your devices
    Player(PlayerOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOptions {
    pub uri: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    pub uri: String,

    /// Only list items whose name contains all given terms
    #[clap(long, num_args = 1..)]
    pub search: Option<Vec<String>>,
}

#[derive(Parser, Debug, Clone)]
pub struct MeOptions {
    /// List saved tracks instead of playlists
    #[clap(long)]
    pub tracks: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    pub query: String,

    /// Comma separated result types
    #[clap(
        long = "type",
        default_value = "track",
        value_parser = utils::parse_search_types
    )]
    pub types: utils::SearchTypes,

    /// Results per type (1-50)
    #[clap(long, default_value_t = 10)]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayerOptions {
    /// Target device id (see `player devices`)
    #[clap(long, global = true)]
    pub device: Option<String>,

    #[clap(subcommand)]
    pub command: PlayerCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlayerCommand {
    /// Start or resume playback
    Play {
        /// Tracks or episodes to play in order
        uris: Vec<String>,

        /// Playlist, album, artist or show to play
        #[clap(long, conflicts_with = "uris")]
        context: Option<String>,

        /// Position inside the context to start at
        #[clap(long, requires = "context")]
        offset: Option<u32>,

        #[clap(long)]
        position_ms: Option<u64>,
    },

    /// Pause playback
    Pause,

    /// Skip to the next item
    Next,

    /// Skip to the previous item
    Prev,

    /// Turn shuffle on or off
    Shuffle {
        #[clap(value_parser = clap::builder::BoolishValueParser::new())]
        state: bool,
    },

    /// Add a track or episode to the queue
    Queue { uri: String },

    /// List available devices
    Devices,

    /// Move playback to another device
    Transfer {
        device_id: String,

        /// Start playing on the new device
        #[clap(long)]
        play: bool,
    },

    /// Show what is playing
    Status,
}

impl From<PlayerCommand> for cli::PlayerAction {
    fn from(command: PlayerCommand) -> Self {
        match command {
            PlayerCommand::Play {
                uris,
                context,
                offset,
                position_ms,
            } => Self::Play {
                uris,
                context,
                offset,
                position_ms,
            },
            PlayerCommand::Pause => Self::Pause,
            PlayerCommand::Next => Self::Next,
            PlayerCommand::Prev => Self::Previous,
            PlayerCommand::Shuffle { state } => Self::Shuffle(state),
            PlayerCommand::Queue { uri } => Self::Queue(uri),
            PlayerCommand::Devices => Self::Devices,
            PlayerCommand::Transfer { device_id, play } => Self::Transfer {
                device: device_id,
                play,
            },
            PlayerCommand::Status => Self::Status,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Show(opt) => cli::show(&opt.uri).await,
        Command::Playlist(opt) => cli::playlist(&opt.uri, opt.search).await,
        Command::Me(opt) => cli::me(opt.tracks).await,
        Command::Search(opt) => cli::search(&opt.query, opt.types.as_slice(), opt.limit).await,
        Command::Player(opt) => cli::player(opt.command.into(), opt.device).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
