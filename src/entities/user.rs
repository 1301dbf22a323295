use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Cacheable, Core, Playlist, check_refs, lazy_get, not_loaded, parse_record},
    error::Result,
    spotify::fetch::{FetchRequest, PagedCollection},
    types::{PlaylistRef, UserRecord},
    uri::{ResourceType, Uri},
};

#[derive(Default)]
struct UserFields {
    display_name: Field<Option<String>>,
    playlists: Field<Vec<Arc<Playlist>>>,
}

pub struct User {
    core: Core,
    fields: RwLock<UserFields>,
}

impl User {
    pub(crate) fn new(core: Core, display_name: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(UserFields {
                display_name: Field::from_hint(display_name.map(|name| Some(name.to_string()))),
                ..Default::default()
            }),
        }
    }

    pub fn uri(&self) -> &Uri {
        self.core.uri()
    }

    /// Display name; `None` when the account has none.
    pub async fn display_name(&self) -> Result<Option<String>> {
        lazy_get(self, "display_name", || {
            self.fields.read().display_name.cloned()
        })
        .await
    }

    /// Public playlists of this user, in API order.
    pub async fn playlists(&self) -> Result<Vec<Arc<Playlist>>> {
        lazy_get(self, "playlists", || self.fields.read().playlists.cloned()).await
    }

    pub fn cached_display_name(&self) -> Option<String> {
        self.fields.read().display_name.cloned().flatten()
    }

    pub(crate) fn offer_name(&self, name: &str) {
        let mut fields = self.fields.write();
        if !fields.display_name.is_loaded() {
            fields.display_name = Field::Loaded(Some(name.to_string()));
        }
    }
}

pub(crate) fn check_playlist_refs(playlists: &[PlaylistRef]) -> Result<()> {
    check_refs(playlists.iter().map(|p| &p.uri), &[ResourceType::Playlist])
}

/// Links shallow playlist references through the cache, keeping their order.
/// Call [`check_playlist_refs`] first.
pub(crate) fn link_playlists(
    cache: &Arc<Cache>,
    playlists: &[PlaylistRef],
) -> Result<Vec<Arc<Playlist>>> {
    playlists
        .iter()
        .map(|playlist| {
            cache.get_playlist(
                &playlist.uri,
                Some(&playlist.name),
                playlist.snapshot_id.as_deref(),
            )
        })
        .collect()
}

pub(crate) fn playlist_refs(playlists: &[Arc<Playlist>]) -> Vec<PlaylistRef> {
    playlists
        .iter()
        .map(|playlist| PlaylistRef {
            uri: playlist.uri().clone(),
            name: playlist.cached_name().unwrap_or_default(),
            snapshot_id: playlist.cached_snapshot_id(),
        })
        .collect()
}

impl Cacheable for User {
    fn record_name(&self) -> String {
        self.core.uri().to_string()
    }

    fn cache(&self) -> Result<Arc<Cache>> {
        self.core.cache()
    }

    fn load_lock(&self) -> &Mutex<()> {
        self.core.load_lock()
    }

    fn fetch_request(&self, page_size: u32) -> FetchRequest {
        let id = self.uri().id();
        FetchRequest::new(format!("users/{}", id))
            .fields("display_name,uri")
            .collection(
                PagedCollection::separate("playlists", format!("users/{}/playlists", id), page_size)
                    .fields("next,items(uri,name,snapshot_id)"),
            )
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: UserRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        check_playlist_refs(&record.playlists.items)?;
        let playlists = link_playlists(cache, &record.playlists.items)?;

        *self.fields.write() = UserFields {
            display_name: Field::Loaded(record.display_name),
            playlists: Field::Loaded(playlists),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let (display_name, playlists) = {
            let fields = self.fields.read();
            match (fields.display_name.cloned(), fields.playlists.cloned()) {
                (Some(display_name), Some(playlists)) => (display_name, playlists),
                _ => return Err(not_loaded(self)),
            }
        };

        let record = UserRecord {
            uri: self.uri().clone(),
            display_name,
            playlists: playlist_refs(&playlists).into(),
        };
        Ok(serde_json::to_value(record)?)
    }

    fn is_loaded(&self) -> bool {
        let fields = self.fields.read();
        fields.display_name.is_loaded() && fields.playlists.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.display_name.fail(reason);
        fields.playlists.fail(reason);
    }
}
