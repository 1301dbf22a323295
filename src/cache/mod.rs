//! The identity map and the load protocol.
//!
//! A [`Cache`] hands out exactly one entity instance per identifier for its
//! whole lifetime. Entities start out as shells and are populated on demand:
//!
//! 1. a record is read from the disk store if one is configured and readable,
//!    otherwise the entity's [`FetchRequest`] is executed against the transport;
//! 2. the record is applied with [`Cacheable::load_dict`];
//! 3. if applying fails because the record is stale or incomplete, the entity is
//!    fetched once more and applied again, a second failure is returned;
//! 4. freshly fetched data is written back to the store.
//!
//! Loads of one entity are serialized by its own lock, loads of different
//! entities run concurrently.

pub mod disk;
pub mod field;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    cache::disk::{DiskStore, Record},
    entities::{
        Album, Artist, Cacheable, Element, Episode, Me, Playlist, Show, Track, User,
    },
    error::{Error, Result},
    spotify::{
        Transport,
        fetch::{self, MAX_PAGE},
    },
    uri::{ResourceType, Uri},
};

/// Settings of a [`Cache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Directory holding one JSON record per entity. `None` keeps everything in memory.
    pub cache_dir: Option<PathBuf>,
    /// Page size used for paginated collections.
    pub page_size: u32,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            cache_dir: None,
            page_size: MAX_PAGE,
        }
    }
}

impl CacheOptions {
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[derive(Default)]
struct Registry {
    by_uri: HashMap<String, Element>,
    by_type: HashMap<ResourceType, Vec<String>>,
}

pub struct Cache {
    transport: Arc<dyn Transport>,
    store: Option<DiskStore>,
    page_size: u32,
    registry: Mutex<Registry>,
    me: OnceLock<Arc<Me>>,
}

macro_rules! typed_getter {
    ($(#[$doc:meta])* $getter:ident, $variant:ident, $entity:ty) => {
        $(#[$doc])*
        pub fn $getter(self: &Arc<Self>, uri: &Uri, name: Option<&str>) -> Result<Arc<$entity>> {
            if uri.kind() != ResourceType::$variant {
                return Err(type_mismatch(uri, ResourceType::$variant));
            }
            match self.get_element(uri, name) {
                Element::$variant(entity) => Ok(entity),
                _ => Err(type_mismatch(uri, ResourceType::$variant)),
            }
        }
    };
}

fn type_mismatch(uri: &Uri, expected: ResourceType) -> Error {
    Error::TypeMismatch {
        uri: uri.to_string(),
        expected: expected.as_str(),
    }
}

impl Cache {
    pub fn new(transport: Arc<dyn Transport>, options: CacheOptions) -> Arc<Self> {
        Arc::new(Self {
            transport,
            store: options.cache_dir.map(DiskStore::new),
            page_size: options.page_size.max(1),
            registry: Mutex::new(Registry::default()),
            me: OnceLock::new(),
        })
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.store.as_ref().map(DiskStore::root)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Returns the entity for `uri`, creating an unloaded shell on first use.
    ///
    /// `name` is only a hint: it fills in the display name of an entity whose
    /// name is not known yet and is ignored otherwise.
    pub fn get_element(self: &Arc<Self>, uri: &Uri, name: Option<&str>) -> Element {
        let key = uri.to_string();
        let mut registry = self.registry.lock();

        if let Some(element) = registry.by_uri.get(&key) {
            if let Some(name) = name {
                element.offer_name(name);
            }
            return element.clone();
        }

        let element = Element::construct(self, uri.clone(), name);
        registry.by_uri.insert(key.clone(), element.clone());
        registry.by_type.entry(uri.kind()).or_default().push(key);
        element
    }

    typed_getter!(get_track, Track, Track);
    typed_getter!(get_album, Album, Album);
    typed_getter!(get_artist, Artist, Artist);
    typed_getter!(get_episode, Episode, Episode);
    typed_getter!(get_show, Show, Show);
    typed_getter!(
        /// Display names of users are optional; `name` is the display name hint.
        get_user,
        User,
        User
    );

    /// Like the other typed getters, with an additional snapshot id hint.
    pub fn get_playlist(
        self: &Arc<Self>,
        uri: &Uri,
        name: Option<&str>,
        snapshot_id: Option<&str>,
    ) -> Result<Arc<Playlist>> {
        if uri.kind() != ResourceType::Playlist {
            return Err(type_mismatch(uri, ResourceType::Playlist));
        }
        match self.get_element(uri, name) {
            Element::Playlist(playlist) => {
                if let Some(snapshot_id) = snapshot_id {
                    playlist.offer_snapshot_id(snapshot_id);
                }
                Ok(playlist)
            }
            _ => Err(type_mismatch(uri, ResourceType::Playlist)),
        }
    }

    /// All entities of one type, in creation order.
    pub fn elements(&self, kind: ResourceType) -> Vec<Element> {
        let registry = self.registry.lock();
        registry
            .by_type
            .get(&kind)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| registry.by_uri.get(key).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.registry.lock().by_uri.contains_key(&uri.to_string())
    }

    pub fn len(&self) -> usize {
        self.registry.lock().by_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Populates the entity for `uri` unless it is already fully loaded.
    pub async fn load(self: &Arc<Self>, uri: &Uri) -> Result<Element> {
        let element = self.get_element(uri, None);
        self.ensure_loaded(element.as_cacheable()).await?;
        Ok(element)
    }

    /// Fetches the entity for `uri` from the network, bypassing the disk store,
    /// and writes the result back.
    pub async fn refresh(self: &Arc<Self>, uri: &Uri) -> Result<Element> {
        let element = self.get_element(uri, None);
        {
            let entity = element.as_cacheable();
            let _guard = entity.load_lock().lock().await;
            self.run_load(entity, true).await?;
        }
        Ok(element)
    }

    /// The singleton of the authenticated user, not loaded yet.
    pub fn get_me(self: &Arc<Self>) -> Arc<Me> {
        self.me.get_or_init(|| Arc::new(Me::new(self))).clone()
    }

    pub async fn load_me(self: &Arc<Self>) -> Result<Arc<Me>> {
        let me = self.get_me();
        self.ensure_loaded(me.as_ref()).await?;
        Ok(me)
    }

    pub async fn refresh_me(self: &Arc<Self>) -> Result<Arc<Me>> {
        let me = self.get_me();
        {
            let _guard = me.load_lock().lock().await;
            self.run_load(me.as_ref(), true).await?;
        }
        Ok(me)
    }

    /// Loads `entity` once; later calls return immediately.
    pub(crate) async fn ensure_loaded(self: &Arc<Self>, entity: &dyn Cacheable) -> Result<()> {
        let _guard = entity.load_lock().lock().await;
        if entity.is_loaded() {
            return Ok(());
        }
        self.run_load(entity, false).await
    }

    /// Runs the load protocol. The caller holds the entity's load lock.
    async fn run_load(self: &Arc<Self>, entity: &dyn Cacheable, force: bool) -> Result<()> {
        let result = async {
            let record = if force {
                Record::fetched(self.fetch(entity).await?)
            } else {
                self.resolve(entity).await?
            };
            self.apply(entity, record).await
        }
        .await;

        if let Err(e) = &result {
            warn!("failed to load {}: {}", entity.record_name(), e);
            entity.mark_failed(&e.to_string());
        }
        result
    }

    async fn resolve(&self, entity: &dyn Cacheable) -> Result<Record> {
        if let Some(store) = &self.store {
            if let Some(data) = store.load(&entity.record_name()).await {
                return Ok(Record::from_disk(data));
            }
        }
        Ok(Record::fetched(self.fetch(entity).await?))
    }

    async fn apply(self: &Arc<Self>, entity: &dyn Cacheable, record: Record) -> Result<()> {
        let name = entity.record_name();
        let record = match entity.load_dict(self, &record.data) {
            Ok(()) => record,
            Err(e) if e.is_stale() => {
                debug!("record for {} is stale ({}), requesting it again", name, e);
                let record = Record::fetched(self.fetch(entity).await?);
                entity.load_dict(self, &record.data)?;
                record
            }
            Err(e) => return Err(e),
        };

        if !record.fetched {
            debug!("loaded {} from cache", name);
            return Ok(());
        }

        match &self.store {
            Some(store) => {
                store.persist(&name, &entity.to_dict()?).await?;
                debug!("requested and cached {}", name);
            }
            None => debug!("requested {}", name),
        }
        Ok(())
    }

    async fn fetch(&self, entity: &dyn Cacheable) -> Result<serde_json::Value> {
        let request = entity.fetch_request(self.page_size);
        fetch::execute(&request, self.transport.as_ref()).await
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("cache_dir", &self.cache_dir())
            .field("page_size", &self.page_size)
            .field("elements", &self.len())
            .finish()
    }
}
