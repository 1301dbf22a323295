use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Album, Artist, Cacheable, Core, check_refs, lazy_get, not_loaded, parse_record},
    error::Result,
    spotify::fetch::FetchRequest,
    types::{NamedRef, TrackRecord},
    uri::{ResourceType, Uri},
};

#[derive(Default)]
struct TrackFields {
    name: Field<String>,
    album: Field<Arc<Album>>,
    artists: Field<Vec<Arc<Artist>>>,
    duration_ms: Field<u64>,
}

pub struct Track {
    core: Core,
    fields: RwLock<TrackFields>,
}

impl Track {
    pub(crate) fn new(core: Core, name: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(TrackFields {
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

    pub async fn album(&self) -> Result<Arc<Album>> {
        lazy_get(self, "album", || self.fields.read().album.cloned()).await
    }

    pub async fn artists(&self) -> Result<Vec<Arc<Artist>>> {
        lazy_get(self, "artists", || self.fields.read().artists.cloned()).await
    }

    pub async fn duration_ms(&self) -> Result<u64> {
        lazy_get(self, "duration_ms", || self.fields.read().duration_ms.cloned()).await
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

impl Cacheable for Track {
    fn record_name(&self) -> String {
        self.core.uri().to_string()
    }

    fn cache(&self) -> Result<Arc<Cache>> {
        self.core.cache()
    }

    fn load_lock(&self) -> &Mutex<()> {
        self.core.load_lock()
    }

    fn fetch_request(&self, _page_size: u32) -> FetchRequest {
        FetchRequest::new(format!("tracks/{}", self.uri().id()))
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: TrackRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        check_refs([&record.album.uri], &[ResourceType::Album])?;
        check_refs(record.artists.iter().map(|a| &a.uri), &[ResourceType::Artist])?;

        let album = cache.get_album(&record.album.uri, Some(&record.album.name))?;
        let artists = record
            .artists
            .iter()
            .map(|artist| cache.get_artist(&artist.uri, Some(&artist.name)))
            .collect::<Result<Vec<_>>>()?;

        *self.fields.write() = TrackFields {
            name: Field::Loaded(record.name),
            album: Field::Loaded(album),
            artists: Field::Loaded(artists),
            duration_ms: Field::Loaded(record.duration_ms),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        // copy out first; referenced entities are read without holding our lock
        let (name, album, artists, duration_ms) = {
            let fields = self.fields.read();
            match (
                fields.name.cloned(),
                fields.album.cloned(),
                fields.artists.cloned(),
                fields.duration_ms.cloned(),
            ) {
                (Some(name), Some(album), Some(artists), Some(duration_ms)) => {
                    (name, album, artists, duration_ms)
                }
                _ => return Err(not_loaded(self)),
            }
        };

        let record = TrackRecord {
            uri: self.uri().clone(),
            name,
            album: NamedRef {
                uri: album.uri().clone(),
                name: album.cached_name().unwrap_or_default(),
            },
            artists: artists
                .iter()
                .map(|artist| NamedRef {
                    uri: artist.uri().clone(),
                    name: artist.cached_name().unwrap_or_default(),
                })
                .collect(),
            duration_ms,
        };
        Ok(serde_json::to_value(record)?)
    }

    fn is_loaded(&self) -> bool {
        let fields = self.fields.read();
        fields.name.is_loaded()
            && fields.album.is_loaded()
            && fields.artists.is_loaded()
            && fields.duration_ms.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.name.fail(reason);
        fields.album.fail(reason);
        fields.artists.fail(reason);
        fields.duration_ms.fail(reason);
    }
}
