use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Cacheable, Core, Show, check_refs, lazy_get, not_loaded, parse_record},
    error::Result,
    spotify::fetch::FetchRequest,
    types::{EpisodeRecord, Image, NamedRef},
    uri::{ResourceType, Uri},
};

#[derive(Default)]
struct EpisodeFields {
    name: Field<String>,
    description: Field<Option<String>>,
    show: Field<Arc<Show>>,
    images: Field<Vec<Image>>,
}

pub struct Episode {
    core: Core,
    fields: RwLock<EpisodeFields>,
}

impl Episode {
    pub(crate) fn new(core: Core, name: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(EpisodeFields {
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

    pub async fn description(&self) -> Result<Option<String>> {
        lazy_get(self, "description", || {
            self.fields.read().description.cloned()
        })
        .await
    }

    pub async fn show(&self) -> Result<Arc<Show>> {
        lazy_get(self, "show", || self.fields.read().show.cloned()).await
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

impl Cacheable for Episode {
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
        FetchRequest::new(format!("episodes/{}", self.uri().id()))
    }

    fn load_dict(&self, cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: EpisodeRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        check_refs([&record.show.uri], &[ResourceType::Show])?;
        let show = cache.get_show(&record.show.uri, Some(&record.show.name))?;

        *self.fields.write() = EpisodeFields {
            name: Field::Loaded(record.name),
            description: Field::Loaded(record.description),
            show: Field::Loaded(show),
            images: Field::Loaded(record.images),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let (name, description, show, images) = {
            let fields = self.fields.read();
            match (
                fields.name.cloned(),
                fields.description.cloned(),
                fields.show.cloned(),
                fields.images.cloned(),
            ) {
                (Some(name), Some(description), Some(show), Some(images)) => {
                    (name, description, show, images)
                }
                _ => return Err(not_loaded(self)),
            }
        };

        let record = EpisodeRecord {
            uri: self.uri().clone(),
            name,
            description,
            show: NamedRef {
                uri: show.uri().clone(),
                name: show.cached_name().unwrap_or_default(),
            },
            images,
        };
        Ok(serde_json::to_value(record)?)
    }

    fn is_loaded(&self) -> bool {
        let fields = self.fields.read();
        fields.name.is_loaded()
            && fields.description.is_loaded()
            && fields.show.is_loaded()
            && fields.images.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.name.fail(reason);
        fields.description.fail(reason);
        fields.show.fail(reason);
        fields.images.fail(reason);
    }
}
