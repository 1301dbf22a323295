use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    cache::{Cache, field::Field},
    entities::{Cacheable, Core, lazy_get, not_loaded, parse_record},
    error::Result,
    spotify::fetch::FetchRequest,
    types::{ArtistRecord, Image},
    uri::Uri,
};

#[derive(Default)]
struct ArtistFields {
    name: Field<String>,
    genres: Field<Vec<String>>,
    images: Field<Vec<Image>>,
}

pub struct Artist {
    core: Core,
    fields: RwLock<ArtistFields>,
}

impl Artist {
    pub(crate) fn new(core: Core, name: Option<&str>) -> Self {
        Self {
            core,
            fields: RwLock::new(ArtistFields {
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

    pub async fn genres(&self) -> Result<Vec<String>> {
        lazy_get(self, "genres", || self.fields.read().genres.cloned()).await
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

impl Cacheable for Artist {
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
        FetchRequest::new(format!("artists/{}", self.uri().id()))
    }

    fn load_dict(&self, _cache: &Arc<Cache>, data: &Value) -> Result<()> {
        let record: ArtistRecord = parse_record(data)?;
        self.core.check_uri(&record.uri)?;

        *self.fields.write() = ArtistFields {
            name: Field::Loaded(record.name),
            genres: Field::Loaded(record.genres),
            images: Field::Loaded(record.images),
        };
        Ok(())
    }

    fn to_dict(&self) -> Result<Value> {
        let fields = self.fields.read();
        let (Some(name), Some(genres), Some(images)) = (
            fields.name.cloned(),
            fields.genres.cloned(),
            fields.images.cloned(),
        ) else {
            return Err(not_loaded(self));
        };

        let record = ArtistRecord {
            uri: self.uri().clone(),
            name,
            genres,
            images,
        };
        Ok(serde_json::to_value(record)?)
    }

    fn is_loaded(&self) -> bool {
        let fields = self.fields.read();
        fields.name.is_loaded() && fields.genres.is_loaded() && fields.images.is_loaded()
    }

    fn mark_failed(&self, reason: &str) {
        let mut fields = self.fields.write();
        fields.name.fail(reason);
        fields.genres.fail(reason);
        fields.images.fail(reason);
    }
}
