//! Player control through Spotify Connect.
//!
//! These calls act on the authenticated user's active (or a named) device and
//! go straight through the [`Transport`](crate::spotify::Transport); nothing
//! here is cached except the entities referenced by [`Client::playing`].

use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    client::Client,
    entities::{Element, Playable},
    error::{Error, Result},
    types::{Device, DeviceList, PlaybackRecord},
    uri::{ResourceType, Uri},
    utils,
};

/// What [`Client::play`] should start. The default resumes the current playback.
///
/// # Example
///
/// ```
/// let request = PlayRequest::context(album_uri).offset(3);
/// client.play(&request, None).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayRequest {
    pub context: Option<Uri>,
    pub items: Vec<Uri>,
    /// Position inside the context to start at.
    pub offset: Option<u32>,
    pub position_ms: Option<u64>,
}

impl PlayRequest {
    pub fn resume() -> Self {
        Self::default()
    }

    /// Plays a playlist, album, artist or show.
    pub fn context(uri: Uri) -> Self {
        Self {
            context: Some(uri),
            ..Self::default()
        }
    }

    /// Plays the given tracks and episodes in order.
    pub fn items(uris: Vec<Uri>) -> Self {
        Self {
            items: uris,
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn position_ms(mut self, position_ms: u64) -> Self {
        self.position_ms = Some(position_ms);
        self
    }

    /// JSON body of the play call; `None` resumes whatever was playing.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`] when both a context and items are given.
    pub fn body(&self) -> Result<Option<Value>> {
        if self.context.is_some() && !self.items.is_empty() {
            return Err(Error::BadRequest(
                "only one of context and items may be given".to_string(),
            ));
        }
        if self.context.is_none() && self.items.is_empty() {
            return Ok(None);
        }

        let mut body = Map::new();
        if let Some(context) = &self.context {
            body.insert("context_uri".to_string(), json!(context.to_string()));
        }
        if !self.items.is_empty() {
            let uris: Vec<String> = self.items.iter().map(Uri::to_string).collect();
            body.insert("uris".to_string(), json!(uris));
        }
        if let Some(offset) = self.offset {
            body.insert("offset".to_string(), json!({ "position": offset }));
        }
        if let Some(position_ms) = self.position_ms {
            body.insert("position_ms".to_string(), json!(position_ms));
        }
        Ok(Some(Value::Object(body)))
    }
}

/// Snapshot of the current playback.
#[derive(Debug, Clone)]
pub struct Playback {
    pub device: Option<Device>,
    pub is_playing: bool,
    pub shuffle: bool,
    pub repeat: Option<String>,
    pub progress_ms: Option<u64>,
    /// Playlist, album, artist or show being played, if it has an identifier.
    pub context: Option<Element>,
    pub item: Option<Playable>,
}

impl Client {
    /// Starts or resumes playback.
    pub async fn play(&self, request: &PlayRequest, device_id: Option<&str>) -> Result<()> {
        let body = request.body()?;
        self.player_command(Method::PUT, "me/player/play", &[("device_id", device_id)], body)
            .await
    }

    pub async fn pause(&self, device_id: Option<&str>) -> Result<()> {
        self.player_command(Method::PUT, "me/player/pause", &[("device_id", device_id)], None)
            .await
    }

    /// Skips to the next item in the queue.
    pub async fn next(&self, device_id: Option<&str>) -> Result<()> {
        self.player_command(Method::POST, "me/player/next", &[("device_id", device_id)], None)
            .await
    }

    pub async fn previous(&self, device_id: Option<&str>) -> Result<()> {
        self.player_command(
            Method::POST,
            "me/player/previous",
            &[("device_id", device_id)],
            None,
        )
        .await
    }

    pub async fn set_shuffle(&self, state: bool, device_id: Option<&str>) -> Result<()> {
        let state = state.to_string();
        self.player_command(
            Method::PUT,
            "me/player/shuffle",
            &[("state", Some(state.as_str())), ("device_id", device_id)],
            None,
        )
        .await
    }

    /// Appends a track or episode to the queue.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] for identifiers of any other type.
    pub async fn add_to_queue(&self, uri: &Uri, device_id: Option<&str>) -> Result<()> {
        if !matches!(uri.kind(), ResourceType::Track | ResourceType::Episode) {
            return Err(Error::TypeMismatch {
                uri: uri.to_string(),
                expected: "track or episode",
            });
        }
        let uri = uri.to_string();
        self.player_command(
            Method::POST,
            "me/player/queue",
            &[("uri", Some(uri.as_str())), ("device_id", device_id)],
            None,
        )
        .await
    }

    /// Devices registered with Spotify Connect.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        let response = self
            .cache()
            .transport()
            .request(Method::GET, "me/player/devices", None)
            .await?;

        match response {
            Some(data) => Ok(DeviceList::deserialize(&data)
                .map_err(|e| Error::DataShape(format!("device list: {}", e)))?
                .devices),
            None => Ok(Vec::new()),
        }
    }

    /// Moves playback to `device_id`, starting it there when `play` is set.
    pub async fn transfer_playback(&self, device_id: &str, play: bool) -> Result<()> {
        let body = json!({ "device_ids": [device_id], "play": play });
        self.player_command(Method::PUT, "me/player", &[], Some(body))
            .await
    }

    /// Current playback, `None` when nothing is playing on any device.
    ///
    /// The playing item and its context are returned as cache entities.
    pub async fn playing(&self) -> Result<Option<Playback>> {
        let Some(data) = self
            .cache()
            .transport()
            .request(Method::GET, "me/player", None)
            .await?
        else {
            return Ok(None);
        };

        let record = PlaybackRecord::deserialize(&data)
            .map_err(|e| Error::DataShape(format!("playback state: {}", e)))?;

        let item = match &record.item {
            Some(item) if !matches!(item.uri.kind(), ResourceType::Track | ResourceType::Episode) => {
                return Err(Error::DataShape(format!("{} is not playable", item.uri)));
            }
            Some(item) => self
                .cache()
                .get_element(&item.uri, Some(item.name.as_str()))
                .into_playable(),
            None => None,
        };
        let context = record
            .context
            .as_ref()
            .and_then(|context| context.uri.parse::<Uri>().ok())
            .map(|uri| self.cache().get_element(&uri, None));

        Ok(Some(Playback {
            device: record.device,
            is_playing: record.is_playing,
            shuffle: record.shuffle_state,
            repeat: record.repeat_state,
            progress_ms: record.progress_ms,
            context,
            item,
        }))
    }

    async fn player_command(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, Option<&str>)],
        body: Option<Value>,
    ) -> Result<()> {
        let endpoint = utils::endpoint_with_params(endpoint, params);
        debug!("{} {}", method, endpoint);
        self.cache()
            .transport()
            .request(method, &endpoint, body)
            .await?;
        Ok(())
    }
}
