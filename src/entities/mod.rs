//! Cacheable entities.
//!
//! Every Spotify resource type is a struct that implements [`Cacheable`]. Entities
//! are only ever constructed by [`Cache`], which keeps exactly one instance per
//! identifier; references between entities (a track's album, a playlist's
//! owner, ...) are therefore shared `Arc`s obtained from the same cache.
//!
//! Fields start out [`Field::Unloaded`](crate::cache::field::Field) except for
//! the display name hint given at construction. Accessors are async: reading an
//! unloaded field makes the cache load the entity once, after which the
//! in-memory value is returned without further I/O.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::Cache,
    error::{Error, Result},
    spotify::fetch::FetchRequest,
    uri::{ResourceType, Uri},
};

mod album;
mod artist;
mod episode;
mod me;
mod playlist;
mod show;
mod track;
mod user;

pub use album::Album;
pub use artist::Artist;
pub use episode::Episode;
pub use me::{Me, SavedTrack};
pub use playlist::{Playlist, PlaylistItem};
pub use show::Show;
pub use track::Track;
pub use user::User;

/// The contract between the cache and every entity type.
pub trait Cacheable: Send + Sync {
    /// Name of the on-disk record: the canonical identifier, or `me`.
    fn record_name(&self) -> String;

    /// The cache this entity belongs to.
    fn cache(&self) -> Result<Arc<Cache>>;

    /// Serializes loads of this entity.
    fn load_lock(&self) -> &Mutex<()>;

    /// Describes the calls needed to fetch this entity. Never does I/O.
    fn fetch_request(&self, page_size: u32) -> FetchRequest;

    /// Replaces all fields from `data`. Either every field is updated or none is.
    ///
    /// Fails with [`Error::DataShape`] when a required field is missing and with
    /// [`Error::ElementOutdated`] when `data` describes another resource.
    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()>;

    /// Shallow record of the loaded fields, suitable for `load_dict`.
    fn to_dict(&self) -> Result<Value>;

    /// True once every field has been populated.
    fn is_loaded(&self) -> bool;

    /// Records a failed load on every field that is still unknown.
    fn mark_failed(&self, reason: &str);
}

/// State shared by all entity types.
pub(crate) struct Core {
    uri: Uri,
    cache: Weak<Cache>,
    load_lock: Mutex<()>,
}

impl Core {
    pub(crate) fn new(uri: Uri, cache: &Arc<Cache>) -> Self {
        Self {
            uri,
            cache: Arc::downgrade(cache),
            load_lock: Mutex::new(()),
        }
    }

    pub(crate) fn uri(&self) -> &Uri {
        &self.uri
    }

    pub(crate) fn cache(&self) -> Result<Arc<Cache>> {
        self.cache.upgrade().ok_or(Error::CacheDropped)
    }

    pub(crate) fn load_lock(&self) -> &Mutex<()> {
        &self.load_lock
    }

    pub(crate) fn check_uri(&self, found: &Uri) -> Result<()> {
        if found != &self.uri {
            return Err(Error::ElementOutdated {
                expected: self.uri.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }
}

/// Deserializes a record, reporting missing or mistyped fields as data shape errors.
pub(crate) fn parse_record<T: DeserializeOwned>(data: &Value) -> Result<T> {
    T::deserialize(data).map_err(|e| Error::DataShape(e.to_string()))
}

/// Checks the type of every reference in a record before any of them is
/// registered, so a rejected record leaves the cache untouched.
pub(crate) fn check_refs<'a>(
    refs: impl IntoIterator<Item = &'a Uri>,
    allowed: &[ResourceType],
) -> Result<()> {
    for uri in refs {
        if !allowed.contains(&uri.kind()) {
            return Err(Error::DataShape(format!(
                "{} cannot be referenced here",
                uri
            )));
        }
    }
    Ok(())
}

pub(crate) fn not_loaded(entity: &dyn Cacheable) -> Error {
    Error::DataShape(format!("{} is not loaded", entity.record_name()))
}

/// Returns `read()` if it is available, otherwise loads `entity` once and reads again.
pub(crate) async fn lazy_get<T>(
    entity: &dyn Cacheable,
    field: &str,
    read: impl Fn() -> Option<T>,
) -> Result<T> {
    if let Some(value) = read() {
        return Ok(value);
    }

    entity.cache()?.ensure_loaded(entity).await?;

    read().ok_or_else(|| {
        Error::DataShape(format!(
            "{} of {} is unavailable after loading",
            field,
            entity.record_name()
        ))
    })
}

macro_rules! impl_entity_debug {
    ($($entity:ident),*) => {
        $(
            impl std::fmt::Debug for $entity {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.debug_struct(stringify!($entity))
                        .field("uri", &self.record_name())
                        .field("loaded", &self.is_loaded())
                        .finish()
                }
            }
        )*
    };
}

impl_entity_debug!(Track, Album, Artist, Episode, Show, User, Playlist, Me);

/// Any entity addressable by an identifier.
#[derive(Debug, Clone)]
pub enum Element {
    Track(Arc<Track>),
    Playlist(Arc<Playlist>),
    Album(Arc<Album>),
    Artist(Arc<Artist>),
    Episode(Arc<Episode>),
    Show(Arc<Show>),
    User(Arc<User>),
}

type Constructor = fn(Core, Option<&str>) -> Element;

impl Element {
    fn constructor(kind: ResourceType) -> Constructor {
        match kind {
            ResourceType::Track => |core, name| Element::Track(Arc::new(Track::new(core, name))),
            ResourceType::Playlist => {
                |core, name| Element::Playlist(Arc::new(Playlist::new(core, name, None)))
            }
            ResourceType::Album => |core, name| Element::Album(Arc::new(Album::new(core, name))),
            ResourceType::Artist => {
                |core, name| Element::Artist(Arc::new(Artist::new(core, name)))
            }
            ResourceType::Episode => {
                |core, name| Element::Episode(Arc::new(Episode::new(core, name)))
            }
            ResourceType::Show => |core, name| Element::Show(Arc::new(Show::new(core, name))),
            ResourceType::User => |core, name| Element::User(Arc::new(User::new(core, name))),
        }
    }

    /// Builds an empty shell of the variant matching `uri`'s type.
    pub(crate) fn construct(cache: &Arc<Cache>, uri: Uri, name: Option<&str>) -> Element {
        let constructor = Self::constructor(uri.kind());
        constructor(Core::new(uri, cache), name)
    }

    pub fn uri(&self) -> &Uri {
        match self {
            Element::Track(e) => e.uri(),
            Element::Playlist(e) => e.uri(),
            Element::Album(e) => e.uri(),
            Element::Artist(e) => e.uri(),
            Element::Episode(e) => e.uri(),
            Element::Show(e) => e.uri(),
            Element::User(e) => e.uri(),
        }
    }

    pub fn kind(&self) -> ResourceType {
        self.uri().kind()
    }

    pub fn as_cacheable(&self) -> &dyn Cacheable {
        match self {
            Element::Track(e) => e.as_ref(),
            Element::Playlist(e) => e.as_ref(),
            Element::Album(e) => e.as_ref(),
            Element::Artist(e) => e.as_ref(),
            Element::Episode(e) => e.as_ref(),
            Element::Show(e) => e.as_ref(),
            Element::User(e) => e.as_ref(),
        }
    }

    /// Display name; loads the entity when it is not known yet.
    pub async fn name(&self) -> Result<Option<String>> {
        match self {
            Element::Track(e) => e.name().await.map(Some),
            Element::Playlist(e) => e.name().await.map(Some),
            Element::Album(e) => e.name().await.map(Some),
            Element::Artist(e) => e.name().await.map(Some),
            Element::Episode(e) => e.name().await.map(Some),
            Element::Show(e) => e.name().await.map(Some),
            Element::User(e) => e.display_name().await,
        }
    }

    /// Display name if it is already in memory.
    pub fn cached_name(&self) -> Option<String> {
        match self {
            Element::Track(e) => e.cached_name(),
            Element::Playlist(e) => e.cached_name(),
            Element::Album(e) => e.cached_name(),
            Element::Artist(e) => e.cached_name(),
            Element::Episode(e) => e.cached_name(),
            Element::Show(e) => e.cached_name(),
            Element::User(e) => e.cached_display_name(),
        }
    }

    /// Fills in the display name of a shell whose name is still unknown.
    pub(crate) fn offer_name(&self, name: &str) {
        match self {
            Element::Track(e) => e.offer_name(name),
            Element::Playlist(e) => e.offer_name(name),
            Element::Album(e) => e.offer_name(name),
            Element::Artist(e) => e.offer_name(name),
            Element::Episode(e) => e.offer_name(name),
            Element::Show(e) => e.offer_name(name),
            Element::User(e) => e.offer_name(name),
        }
    }

    /// True if both handles point at the same in-memory entity.
    pub fn same_instance(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Track(a), Element::Track(b)) => Arc::ptr_eq(a, b),
            (Element::Playlist(a), Element::Playlist(b)) => Arc::ptr_eq(a, b),
            (Element::Album(a), Element::Album(b)) => Arc::ptr_eq(a, b),
            (Element::Artist(a), Element::Artist(b)) => Arc::ptr_eq(a, b),
            (Element::Episode(a), Element::Episode(b)) => Arc::ptr_eq(a, b),
            (Element::Show(a), Element::Show(b)) => Arc::ptr_eq(a, b),
            (Element::User(a), Element::User(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn into_playable(self) -> Option<Playable> {
        match self {
            Element::Track(track) => Some(Playable::Track(track)),
            Element::Episode(episode) => Some(Playable::Episode(episode)),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cached_name() {
            Some(name) => write!(f, "{} ({})", name, self.uri()),
            None => write!(f, "{}", self.uri()),
        }
    }
}

/// Something that can be played: a track or a podcast episode.
#[derive(Debug, Clone)]
pub enum Playable {
    Track(Arc<Track>),
    Episode(Arc<Episode>),
}

impl Playable {
    pub fn uri(&self) -> &Uri {
        match self {
            Playable::Track(track) => track.uri(),
            Playable::Episode(episode) => episode.uri(),
        }
    }

    pub async fn name(&self) -> Result<String> {
        match self {
            Playable::Track(track) => track.name().await,
            Playable::Episode(episode) => episode.name().await,
        }
    }

    pub fn cached_name(&self) -> Option<String> {
        match self {
            Playable::Track(track) => track.cached_name(),
            Playable::Episode(episode) => episode.cached_name(),
        }
    }
}
