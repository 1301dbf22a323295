use std::sync::{Arc, OnceLock, Weak};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{
        Cacheable, Playlist, Track, User, check_refs, lazy_get, not_loaded, parse_record,
        user::{check_playlist_refs, link_playlists, playlist_refs},
    },
    error::{Error, Result},
    spotify::fetch::{FetchRequest, PagedCollection},
    types::{MeRecord, NamedRef, SavedTrackRecord},
    uri::{ResourceType, Uri},
};

pub(crate) const ME_RECORD: &str = "me";

/// A track in the current user's library.
#[derive(Debug, Clone)]
pub struct SavedTrack {
    pub track: Arc<Track>,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct MeFields {
    display_name: Field<Option<String>>,
    playlists: Field<Vec<Arc<Playlist>>>,
    saved_tracks: Field<Vec<SavedTrack>>,
}

/// The authenticated user.
///
/// Unlike other entities the identifier is not known up front; it is taken
/// from the first record applied and never changes afterwards.
pub struct Me {
    uri: OnceLock<Uri>,
    cache: Weak<Cache>,
    load_lock: Mutex<()>,
    fields: RwLock<MeFields>,
}

impl Me {
    pub(crate) fn new(cache: &Arc<Cache>) -> Self {
        Self {
            uri: OnceLock::new(),
            cache: Arc::downgrade(cache),
            load_lock: Mutex::new(()),
            fields: RwLock::new(MeFields::default()),
        }
    }

    pub async fn uri(&self) -> Result<Uri> {
        lazy_get(self, "uri", || self.uri.get().cloned()).await
    }

    pub async fn display_name(&self) -> Result<Option<String>> {
        lazy_get(self, "display_name", || {
            self.fields.read().display_name.cloned()
        })
        .await
    }

    pub async fn playlists(&self) -> Result<Vec<Arc<Playlist>>> {
        lazy_get(self, "playlists", || self.fields.read().playlists.cloned()).await
    }

    /// Saved tracks, most recently added first.
    pub async fn saved_tracks(&self) -> Result<Vec<SavedTrack>> {
        lazy_get(self, "saved_tracks", || {
            self.fields.read().saved_tracks.cloned()
        })
        .await
    }

    /// The public user profile behind this account.
    pub async fn user(&self) -> Result<Arc<User>> {
        let uri = self.uri().await?;
        let display_name = self.display_name().await?;
        self.cache()?.get_user(&uri, display_name.as_deref())
    }

    pub fn cached_uri(&self) -> Option<&Uri> {
        self.uri.get()
    }
}

impl Cacheable for Me {
    fn record_name(&self) -> String {
        ME_RECORD.to_string()
    }

    fn cache(&self) -> Result<Arc<Cache>> {
        self.cache.upgrade().ok_or(Error::CacheDropped)
    }

    fn load_lock(&self) -> &Mutex<()> {
        &self.load_lock
    }

    fn fetch_request(&self, page_size: u32) -> FetchRequest {
        FetchRequest::new("me")
            .fields("display_name,uri")
            .collection(
                PagedCollection::separate("playlists", "me/playlists", page_size)
                    .fields("next,items(uri,name,snapshot_id)"),
            )
            .collection(
                PagedCollection::separate("tracks", "me/tracks", page_size)
                    .fields("next,items(added_at,track(uri,name))"),
            )
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: MeRecord = parse_record(data)?;
        if let Some(current) = self.uri.get() {
            if current != &record.uri {
                return Err(Error::ElementOutdated {
                    expected: current.to_string(),
                    found: record.uri.to_string(),
                });
            }
        }

        check_playlist_refs(&record.playlists.items)?;
        check_refs(
            record.tracks.items.iter().map(|saved| &saved.track.uri),
            &[ResourceType::Track],
        )?;

        let playlists = link_playlists(cache, &record.playlists.items)?;
        let saved_tracks = record
            .tracks
            .items
            .iter()
            .map(|saved| -> Result<SavedTrack> {
                let track = cache.get_track(&saved.track.uri, Some(&saved.track.name))?;
                Ok(SavedTrack {
                    track,
                    added_at: saved.added_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        *self.fields.write() = MeFields {
            display_name: Field::Loaded(record.display_name),
            playlists: Field::Loaded(playlists),
            saved_tracks: Field::Loaded(saved_tracks),
        };
        // already equal when set
        let _ = self.uri.set(record.uri);
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let Some(uri) = self.uri.get().cloned() else {
            return Err(not_loaded(self));
        };
        let (display_name, playlists, saved_tracks) = {
            let fields = self.fields.read();
            match (
                fields.display_name.cloned(),
                fields.playlists.cloned(),
                fields.saved_tracks.cloned(),
            ) {
                (Some(display_name), Some(playlists), Some(saved_tracks)) => {
                    (display_name, playlists, saved_tracks)
                }
                _ => return Err(not_loaded(self)),
            }
        };

        let record = MeRecord {
            uri,
            display_name,
            playlists: playlist_refs(&playlists).into(),
            tracks: saved_tracks
                .iter()
                .map(|saved| SavedTrackRecord {
                    added_at: saved.added_at,
                    track: NamedRef {
                        uri: saved.track.uri().clone(),
                        name: saved.track.cached_name().unwrap_or_default(),
                    },
                })
                .collect::<Vec<_>>()
                .into(),
        };
        Ok(serde_json::to_value(record)?)
    }

    fn is_loaded(&self) -> bool {
        let fields = self.fields.read();
        self.uri.get().is_some()
            && fields.display_name.is_loaded()
            && fields.playlists.is_loaded()
            && fields.saved_tracks.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.display_name.fail(reason);
        fields.playlists.fail(reason);
        fields.saved_tracks.fail(reason);
    }
}
