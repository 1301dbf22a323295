use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;
use tabled::Tabled;

use crate::uri::Uri;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authentication {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub show_dialog: bool,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Unix timestamp (seconds) at which `token` expires.
    #[serde(default)]
    pub token_expires: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    /// Random value echoed back by the authorization server.
    pub state: String,
    pub token: Option<TokenResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(items: Vec<T>) -> Self {
        Page { items }
    }
}

/// Shallow reference to a named resource (track, album, artist, episode, show).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub uri: Uri,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub uri: Uri,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub uri: Uri,
    pub name: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub uri: Uri,
    pub name: String,
    pub album: NamedRef,
    pub artists: Vec<NamedRef>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub uri: Uri,
    pub name: String,
    pub artists: Vec<NamedRef>,
    pub tracks: Page<NamedRef>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub uri: Uri,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub uri: Uri,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub show: NamedRef,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub uri: Uri,
    pub name: String,
    #[serde(default)]
    pub publisher: Option<String>,
    pub episodes: Page<NamedRef>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub uri: Uri,
    #[serde(default)]
    pub display_name: Option<String>,
    pub playlists: Page<PlaylistRef>,
}

/// Type segment of identifiers of local files (`spotify:local:...`).
const LOCAL_KIND: &str = "local";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItemRecord {
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// `None` for items that are no longer available and for local files,
    /// which have no regular identifier.
    #[serde(default, deserialize_with = "playable_ref")]
    pub track: Option<NamedRef>,
}

/// `null` and local files become `None`; any other malformed reference is an error.
fn playable_ref<'de, D>(deserializer: D) -> Result<Option<NamedRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let is_local = value
        .get("uri")
        .and_then(Value::as_str)
        .and_then(|uri| uri.split(':').nth(1))
        .is_some_and(|kind| kind == LOCAL_KIND);
    if is_local {
        return Ok(None);
    }

    NamedRef::deserialize(value)
        .map(Some)
        .map_err(D::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub uri: Uri,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: UserRef,
    pub snapshot_id: String,
    #[serde(default)]
    pub public: Option<bool>,
    pub tracks: Page<PlaylistItemRecord>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTrackRecord {
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    pub track: NamedRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeRecord {
    pub uri: Uri,
    #[serde(default)]
    pub display_name: Option<String>,
    pub playlists: Page<PlaylistRef>,
    pub tracks: Page<SavedTrackRecord>,
}

/// A Spotify Connect device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Missing for restricted devices, which cannot be targeted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub volume_percent: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextRef {
    pub uri: String,
}

/// Response of the player endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackRecord {
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub shuffle_state: bool,
    #[serde(default)]
    pub repeat_state: Option<String>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    /// Not every context has a regular identifier (e.g. the liked songs collection).
    #[serde(default)]
    pub context: Option<ContextRef>,
    #[serde(default, deserialize_with = "playable_ref")]
    pub item: Option<NamedRef>,
}

#[derive(Tabled)]
pub struct DeviceTableRow {
    pub active: String,
    pub name: String,
    pub kind: String,
    pub volume: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct FieldTableRow {
    pub field: String,
    pub value: String,
}

#[derive(Tabled)]
pub struct ItemTableRow {
    pub position: usize,
    pub name: String,
    pub added_at: String,
    pub uri: String,
}

#[derive(Tabled)]
pub struct ElementTableRow {
    pub kind: String,
    pub name: String,
    pub uri: String,
}
