use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Artist, Cacheable, Core, Track, check_refs, lazy_get, not_loaded, parse_record},
    error::Result,
    spotify::fetch::{FetchRequest, PagedCollection},
    types::{AlbumRecord, Image, NamedRef},
    uri::{ResourceType, Uri},
};

#[derive(Default)]
struct AlbumFields {
    name: Field<String>,
    artists: Field<Vec<Arc<Artist>>>,
    tracks: Field<Vec<Arc<Track>>>,
    images: Field<Vec<Image>>,
}

pub struct Album {
    core: Core,
    fields: RwLock<AlbumFields>,
}

impl Album {
    pub(crate) fn new(core: Core, name: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(AlbumFields {
                name: Field::from_hint(name.map(str::to_string)),
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

    pub async fn artists(&self) -> Result<Vec<Arc<Artist>>> {
        lazy_get(self, "artists", || self.fields.read().artists.cloned()).await
    }

    /// Tracks in album order, stitched from all pages.
    pub async fn tracks(&self) -> Result<Vec<Arc<Track>>> {
        lazy_get(self, "tracks", || self.fields.read().tracks.cloned()).await
    }

    pub async fn images(&self) -> Result<Vec<Image>> {
        lazy_get(self, "images", || self.fields.read().images.cloned()).await
    }

    pub fn cached_name(&self) -> Option<String> {
        self.fields.read().name.cloned()
    }

    pub(crate) fn offer_name(&self, name: &str) {
        let mut fields = self.fields.write();
        if !fields.name.is_loaded() {
            fields.name = Field::Loaded(name.to_string());
        }
    }
}

impl Cacheable for Album {
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
        FetchRequest::new(format!("albums/{}", id)).collection(PagedCollection::embedded(
            "tracks",
            format!("albums/{}/tracks", id),
            page_size,
        ))
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: AlbumRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        check_refs(record.artists.iter().map(|a| &a.uri), &[ResourceType::Artist])?;
        check_refs(record.tracks.items.iter().map(|t| &t.uri), &[ResourceType::Track])?;

        let artists = record
            .artists
            .iter()
            .map(|artist| cache.get_artist(&artist.uri, Some(&artist.name)))
            .collect::<Result<Vec<_>>>()?;
        let tracks = record
            .tracks
            .items
            .iter()
            .map(|track| cache.get_track(&track.uri, Some(&track.name)))
            .collect::<Result<Vec<_>>>()?;

        *self.fields.write() = AlbumFields {
            name: Field::Loaded(record.name),
            artists: Field::Loaded(artists),
            tracks: Field::Loaded(tracks),
            images: Field::Loaded(record.images),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let (name, artists, tracks, images) = {
            let fields = self.fields.read();
            match (
                fields.name.cloned(),
                fields.artists.cloned(),
                fields.tracks.cloned(),
                fields.images.cloned(),
            ) {
                (Some(name), Some(artists), Some(tracks), Some(images)) => {
                    (name, artists, tracks, images)
                }
                _ => return Err(not_loaded(self)),
            }
        };

        let record = AlbumRecord {
            uri: self.uri().clone(),
            name,
            artists: artists
                .iter()
                .map(|artist| NamedRef {
                    uri: artist.uri().clone(),
                    name: artist.cached_name().unwrap_or_default(),
                })
                .collect(),
            tracks: tracks
                .iter()
                .map(|track| NamedRef {
                    uri: track.uri().clone(),
                    name: track.cached_name().unwrap_or_default(),
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
            && fields.artists.is_loaded()
            && fields.tracks.is_loaded()
            && fields.images.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.name.fail(reason);
        fields.artists.fail(reason);
        fields.tracks.fail(reason);
        fields.images.fail(reason);
    }
}
