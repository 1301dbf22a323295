use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Cacheable, Core, Episode, check_refs, lazy_get, not_loaded, parse_record},
    error::Result,
    spotify::fetch::{FetchRequest, PagedCollection},
    types::{Image, NamedRef, ShowRecord},
    uri::{ResourceType, Uri},
};

#[derive(Default)]
struct ShowFields {
    name: Field<String>,
    publisher: Field<Option<String>>,
    episodes: Field<Vec<Arc<Episode>>>,
    images: Field<Vec<Image>>,
}

pub struct Show {
    core: Core,
    fields: RwLock<ShowFields>,
}

impl Show {
    pub(crate) fn new(core: Core, name: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(ShowFields {
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

    pub async fn publisher(&self) -> Result<Option<String>> {
        lazy_get(self, "publisher", || self.fields.read().publisher.cloned()).await
    }

    /// Episodes in API order, stitched from all pages.
    pub async fn episodes(&self) -> Result<Vec<Arc<Episode>>> {
        lazy_get(self, "episodes", || self.fields.read().episodes.cloned()).await
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

impl Cacheable for Show {
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
        FetchRequest::new(format!("shows/{}", id)).collection(PagedCollection::embedded(
            "episodes",
            format!("shows/{}/episodes", id),
            page_size,
        ))
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: ShowRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        check_refs(record.episodes.items.iter().map(|e| &e.uri), &[ResourceType::Episode])?;

        let episodes = record
            .episodes
            .items
            .iter()
            .map(|episode| cache.get_episode(&episode.uri, Some(&episode.name)))
            .collect::<Result<Vec<_>>>()?;

        *self.fields.write() = ShowFields {
            name: Field::Loaded(record.name),
            publisher: Field::Loaded(record.publisher),
            episodes: Field::Loaded(episodes),
            images: Field::Loaded(record.images),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let (name, publisher, episodes, images) = {
            let fields = self.fields.read();
            match (
                fields.name.cloned(),
                fields.publisher.cloned(),
                fields.episodes.cloned(),
                fields.images.cloned(),
            ) {
                (Some(name), Some(publisher), Some(episodes), Some(images)) => {
                    (name, publisher, episodes, images)
                }
                _ => return Err(not_loaded(self)),
            }
        };

        let record = ShowRecord {
            uri: self.uri().clone(),
            name,
            publisher,
            episodes: episodes
                .iter()
                .map(|episode| NamedRef {
                    uri: episode.uri().clone(),
                    name: episode.cached_name().unwrap_or_default(),
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
            && fields.publisher.is_loaded()
            && fields.episodes.is_loaded()
            && fields.images.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.name.fail(reason);
        fields.publisher.fail(reason);
        fields.episodes.fail(reason);
        fields.images.fail(reason);
    }
}
