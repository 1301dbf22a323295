use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Cacheable, Core, Playable, User, check_refs, lazy_get, not_loaded, parse_record},
    error::{Error, Result},
    spotify::fetch::{FetchRequest, MAX_PLAYLIST_PAGE, PagedCollection},
    types::{Image, NamedRef, PlaylistItemRecord, PlaylistRecord, UserRef},
    uri::{ResourceType, Uri},
    utils,
};

const ITEM_FIELDS: &str = "next,items(added_at,track(uri,name))";

/// One entry of a playlist.
#[derive(Debug, Clone)]
pub struct PlaylistItem {
    pub track: Playable,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct PlaylistFields {
    name: Field<String>,
    description: Field<Option<String>>,
    owner: Field<Arc<User>>,
    snapshot_id: Field<String>,
    public: Field<Option<bool>>,
    items: Field<Vec<PlaylistItem>>,
    images: Field<Vec<Image>>,
}

pub struct Playlist {
    core: Core,
    fields: RwLock<PlaylistFields>,
}

impl Playlist {
    pub(crate) fn new(core: Core, name: Option<&str>, snapshot_id: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(PlaylistFields {
                name: Field::from_hint(name.map(str::to_string)),
                snapshot_id: Field::from_hint(snapshot_id.map(str::to_string)),
                ..Default::default()
            }),
        }
    }

    pub fn uri(&self) -> &Uri {
        self.core.uri()
    }

    pub async fn name(&self) -> Result<String> {
        lazy_get(self, "name", || self.fields.read().name.cloned()).await
    }

    pub async fn description(&self) -> Result<Option<String>> {
        lazy_get(self, "description", || {
            self.fields.read().description.cloned()
        })
        .await
    }

    pub async fn owner(&self) -> Result<Arc<User>> {
        lazy_get(self, "owner", || self.fields.read().owner.cloned()).await
    }

    pub async fn snapshot_id(&self) -> Result<String> {
        lazy_get(self, "snapshot_id", || {
            self.fields.read().snapshot_id.cloned()
        })
        .await
    }

    pub async fn public(&self) -> Result<Option<bool>> {
        lazy_get(self, "public", || self.fields.read().public.cloned()).await
    }

    /// Items in playlist order, stitched from all pages.
    pub async fn items(&self) -> Result<Vec<PlaylistItem>> {
        lazy_get(self, "items", || self.fields.read().items.cloned()).await
    }

    pub async fn images(&self) -> Result<Vec<Image>> {
        lazy_get(self, "images", || self.fields.read().images.cloned()).await
    }

    /// Items whose name contains every term, ignoring case.
    pub async fn search(&self, terms: &[String]) -> Result<Vec<Playable>> {
        let mut results = Vec::new();
        for item in self.items().await? {
            let name = match item.track.cached_name() {
                Some(name) => name,
                None => item.track.name().await?,
            };
            if utils::matches_all_terms(&name, terms) {
                results.push(item.track);
            }
        }
        Ok(results)
    }

    pub fn cached_name(&self) -> Option<String> {
        self.fields.read().name.cloned()
    }

    pub fn cached_snapshot_id(&self) -> Option<String> {
        self.fields.read().snapshot_id.cloned()
    }

    pub(crate) fn offer_name(&self, name: &str) {
        let mut fields = self.fields.write();
        if !fields.name.is_loaded() {
            fields.name = Field::Loaded(name.to_string());
        }
    }

    pub(crate) fn offer_snapshot_id(&self, snapshot_id: &str) {
        let mut fields = self.fields.write();
        if !fields.snapshot_id.is_loaded() {
            fields.snapshot_id = Field::Loaded(snapshot_id.to_string());
        }
    }
}

fn link_items(cache: &Arc<Cache>, items: &[PlaylistItemRecord]) -> Result<Vec<PlaylistItem>> {
    items
        .iter()
        .filter_map(|item| item.track.as_ref().map(|track| (track, item.added_at)))
        .map(|(track, added_at)| -> Result<PlaylistItem> {
            let element = cache.get_element(&track.uri, Some(&track.name));
            let track = element.into_playable().ok_or_else(|| {
                Error::DataShape(format!("{} cannot be a playlist item", track.uri))
            })?;
            Ok(PlaylistItem { track, added_at })
        })
        .collect()
}

impl Cacheable for Playlist {
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
        FetchRequest::new(format!("playlists/{}", id))
            .fields(format!(
                "uri,name,description,owner(uri,display_name),snapshot_id,public,images,tracks({})",
                ITEM_FIELDS
            ))
            .collection(
                PagedCollection::embedded("tracks", format!("playlists/{}/tracks", id), page_size)
                    .max_limit(page_size, MAX_PLAYLIST_PAGE)
                    .fields(ITEM_FIELDS),
            )
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: PlaylistRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        check_refs([&record.owner.uri], &[ResourceType::User])?;
        check_refs(
            record.tracks.items.iter().filter_map(|item| item.track.as_ref()).map(|t| &t.uri),
            &[ResourceType::Track, ResourceType::Episode],
        )?;

        let owner = cache.get_user(&record.owner.uri, record.owner.display_name.as_deref())?;
        let items = link_items(cache, &record.tracks.items)?;

        *self.fields.write() = PlaylistFields {
            name: Field::Loaded(record.name),
            description: Field::Loaded(record.description),
            owner: Field::Loaded(owner),
            snapshot_id: Field::Loaded(record.snapshot_id),
            public: Field::Loaded(record.public),
            items: Field::Loaded(items),
            images: Field::Loaded(record.images),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let fields = {
            let fields = self.fields.read();
            match (
                fields.name.cloned(),
                fields.description.cloned(),
                fields.owner.cloned(),
                fields.snapshot_id.cloned(),
                fields.public.cloned(),
                fields.items.cloned(),
                fields.images.cloned(),
            ) {
                (
                    Some(name),
                    Some(description),
                    Some(owner),
                    Some(snapshot_id),
                    Some(public),
                    Some(items),
                    Some(images),
                ) => (name, description, owner, snapshot_id, public, items, images),
                _ => return Err(not_loaded(self)),
            }
        };
        let (name, description, owner, snapshot_id, public, items, images) = fields;

        let record = PlaylistRecord {
            uri: self.uri().clone(),
            name,
            description,
            owner: UserRef {
                uri: owner.uri().clone(),
                display_name: owner.cached_display_name(),
            },
            snapshot_id,
            public,
            tracks: items
                .iter()
                .map(|item| PlaylistItemRecord {
                    added_at: item.added_at,
                    track: Some(NamedRef {
                        uri: item.track.uri().clone(),
                        name: item.track.cached_name().unwrap_or_default(),
                    }),
                })
                .collect::<Vec<_>>()
                .into(),
            images,
        };
        Ok(serde_json::to_value(record)?)
    }

    fn is_loaded(&self) -> bool {
        let fields = self.fields.read();
        fields.name.is_loaded()
            && fields.description.is_loaded()
            && fields.owner.is_loaded()
            && fields.snapshot_id.is_loaded()
            && fields.public.is_loaded()
            && fields.items.is_loaded()
            && fields.images.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.name.fail(reason);
        fields.description.fail(reason);
        fields.owner.fail(reason);
        fields.snapshot_id.fail(reason);
        fields.public.fail(reason);
        fields.items.fail(reason);
        fields.images.fail(reason);
    }
}
