use tabled::Table;

use crate::{
    Client, PlayRequest, cli, error,
    error::Result,
    info, success,
    types::{DeviceTableRow, FieldTableRow},
    uri::Uri,
    warning,
};

/// Player actions offered by `spotcache player`.
#[derive(Debug, Clone)]
pub enum PlayerAction {
    Play {
        uris: Vec<String>,
        context: Option<String>,
        offset: Option<u32>,
        position_ms: Option<u64>,
    },
    Pause,
    Next,
    Previous,
    Shuffle(bool),
    Queue(String),
    Devices,
    Transfer { device: String, play: bool },
    Status,
}

pub async fn player(action: PlayerAction, device: Option<String>) {
    let client = cli::connect().await;
    let device = device.as_deref();

    match action {
        PlayerAction::Devices => devices(&client).await,
        PlayerAction::Status => status(&client).await,
        action => {
            let description = describe(&action);
            match run(&client, action, device).await {
                Ok(()) => success!("{}", description),
                Err(e) => error!("Player command failed. Err: {}", e),
            }
        }
    }
}

fn describe(action: &PlayerAction) -> String {
    match action {
        PlayerAction::Play { .. } => "Playback started".to_string(),
        PlayerAction::Pause => "Playback paused".to_string(),
        PlayerAction::Next => "Skipped to next".to_string(),
        PlayerAction::Previous => "Skipped to previous".to_string(),
        PlayerAction::Shuffle(state) => format!("Shuffle set to {}", state),
        PlayerAction::Queue(uri) => format!("Queued {}", uri),
        PlayerAction::Transfer { device, .. } => format!("Playback moved to {}", device),
        PlayerAction::Devices | PlayerAction::Status => String::new(),
    }
}

fn parse_uri(s: &str) -> Result<Uri> {
    s.parse()
}

async fn run(client: &Client, action: PlayerAction, device: Option<&str>) -> Result<()> {
    match action {
        PlayerAction::Play {
            uris,
            context,
            offset,
            position_ms,
        } => {
            let request = PlayRequest {
                context: context.as_deref().map(parse_uri).transpose()?,
                items: uris.iter().map(|uri| parse_uri(uri)).collect::<Result<_>>()?,
                offset,
                position_ms,
            };
            client.play(&request, device).await
        }
        PlayerAction::Pause => client.pause(device).await,
        PlayerAction::Next => client.next(device).await,
        PlayerAction::Previous => client.previous(device).await,
        PlayerAction::Shuffle(state) => client.set_shuffle(state, device).await,
        PlayerAction::Queue(uri) => client.add_to_queue(&parse_uri(&uri)?, device).await,
        PlayerAction::Transfer { device, play } => client.transfer_playback(&device, play).await,
        PlayerAction::Devices | PlayerAction::Status => Ok(()),
    }
}

async fn devices(client: &Client) {
    let pb = cli::spinner("Fetching devices...");
    let result = client.devices().await;
    pb.finish_and_clear();

    let devices = match result {
        Ok(devices) => devices,
        Err(e) => error!("Cannot fetch devices. Err: {}", e),
    };

    if devices.is_empty() {
        warning!("No devices available");
        return;
    }

    let rows: Vec<DeviceTableRow> = devices
        .into_iter()
        .map(|device| DeviceTableRow {
            active: if device.is_active { "*" } else { "" }.to_string(),
            name: device.name,
            kind: device.kind,
            volume: device
                .volume_percent
                .map(|volume| format!("{}%", volume))
                .unwrap_or_else(|| "-".to_string()),
            id: device.id.unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("{}", Table::new(rows));
}

async fn status(client: &Client) {
    let pb = cli::spinner("Fetching playback state...");
    let result = client.playing().await;
    pb.finish_and_clear();

    let playback = match result {
        Ok(Some(playback)) => playback,
        Ok(None) => {
            info!("Nothing is playing");
            return;
        }
        Err(e) => error!("Cannot fetch playback state. Err: {}", e),
    };

    let field = |field: &str, value: String| FieldTableRow {
        field: field.to_string(),
        value,
    };
    let rows = vec![
        field(
            "state",
            if playback.is_playing { "playing" } else { "paused" }.to_string(),
        ),
        field(
            "item",
            playback
                .item
                .as_ref()
                .map(|item| {
                    item.cached_name()
                        .unwrap_or_else(|| item.uri().to_string())
                })
                .unwrap_or_else(|| "-".to_string()),
        ),
        field(
            "context",
            playback
                .context
                .as_ref()
                .map(|context| context.uri().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        field(
            "device",
            playback
                .device
                .map(|device| device.name)
                .unwrap_or_else(|| "-".to_string()),
        ),
        field(
            "progress",
            playback
                .progress_ms
                .map(|ms| format!("{}:{:02}", ms / 60_000, (ms / 1000) % 60))
                .unwrap_or_else(|| "-".to_string()),
        ),
        field("shuffle", playback.shuffle.to_string()),
        field("repeat", playback.repeat.unwrap_or_else(|| "-".to_string())),
    ];
    println!("{}", Table::new(rows));
}
