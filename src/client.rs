//! Convenience entry point on top of [`Cache`].
//!
//! [`Client`] accepts identifiers as strings, wires the configured
//! [`Connection`] into a cache, and exposes the search endpoint whose results
//! are returned as cache entities carrying their name as a hint.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    cache::{Cache, CacheOptions},
    config,
    entities::{Album, Artist, Element, Episode, Me, Playlist, Show, Track, User},
    error::{Error, Result},
    spotify::{Transport, connection::Connection, fetch::MAX_PAGE},
    uri::Uri,
    utils,
};

#[derive(Debug, Deserialize)]
struct SearchHit {
    uri: Uri,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    snapshot_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    cache: Arc<Cache>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, options: CacheOptions) -> Self {
        Self {
            cache: Cache::new(transport, options),
        }
    }

    pub fn from_cache(cache: Arc<Cache>) -> Self {
        Self { cache }
    }

    /// Builds a client from the persisted authentication state and the
    /// environment configuration.
    pub async fn connect() -> Result<Self> {
        let connection = Connection::from_disk().await?;
        Ok(Self::new(Arc::new(connection), config::cache_options()))
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    pub fn element(&self, uri: &str) -> Result<Element> {
        Ok(self.cache.get_element(&uri.parse()?, None))
    }

    pub fn track(&self, uri: &str) -> Result<Arc<Track>> {
        self.cache.get_track(&uri.parse()?, None)
    }

    pub fn album(&self, uri: &str) -> Result<Arc<Album>> {
        self.cache.get_album(&uri.parse()?, None)
    }

    pub fn artist(&self, uri: &str) -> Result<Arc<Artist>> {
        self.cache.get_artist(&uri.parse()?, None)
    }

    pub fn episode(&self, uri: &str) -> Result<Arc<Episode>> {
        self.cache.get_episode(&uri.parse()?, None)
    }

    pub fn show(&self, uri: &str) -> Result<Arc<Show>> {
        self.cache.get_show(&uri.parse()?, None)
    }

    pub fn user(&self, uri: &str) -> Result<Arc<User>> {
        self.cache.get_user(&uri.parse()?, None)
    }

    pub fn playlist(&self, uri: &str) -> Result<Arc<Playlist>> {
        self.cache.get_playlist(&uri.parse()?, None, None)
    }

    /// Parses and loads `uri` in one step.
    pub async fn load(&self, uri: &str) -> Result<Element> {
        self.cache.load(&uri.parse()?).await
    }

    pub fn me(&self) -> Arc<Me> {
        self.cache.get_me()
    }

    /// Runs a catalog search and returns the hits as (unloaded) entities.
    ///
    /// # Arguments
    ///
    /// * `query` - Free text search query
    /// * `types` - Search types such as `track` or `album`, see
    ///   [`utils::parse_search_types`]
    /// * `limit` - Results per type, clamped to 1..=50
    /// * `offset` - Index of the first result per type
    ///
    /// Hits are grouped by type in the order of `types`; null entries the API
    /// sometimes returns are skipped.
    pub async fn search(
        &self,
        query: &str,
        types: &[String],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Element>> {
        if types.is_empty() {
            return Err(Error::BadRequest("no search type given".to_string()));
        }

        let type_list = types.join(",");
        let limit = limit.clamp(1, MAX_PAGE).to_string();
        let offset = offset.to_string();
        let endpoint = format!(
            "search?{}",
            utils::encode_query(&[
                ("q", query),
                ("type", type_list.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
        );

        let response = self
            .cache
            .transport()
            .request(Method::GET, &endpoint, None)
            .await?
            .ok_or_else(|| Error::DataShape("empty search response".to_string()))?;

        let mut results = Vec::new();
        for kind in types {
            let key = format!("{}s", kind);
            let Some(items) = response
                .get(&key)
                .and_then(|page| page.get("items"))
                .and_then(Value::as_array)
            else {
                debug!("search response has no {} section", key);
                continue;
            };

            for item in items.iter().filter(|item| !item.is_null()) {
                let hit = SearchHit::deserialize(item)
                    .map_err(|e| Error::DataShape(format!("search hit: {}", e)))?;
                results.push(self.hit_element(hit)?);
            }
        }
        Ok(results)
    }

    fn hit_element(&self, hit: SearchHit) -> Result<Element> {
        let name = hit.name.as_deref();
        if hit.snapshot_id.is_some() {
            let playlist = self
                .cache
                .get_playlist(&hit.uri, name, hit.snapshot_id.as_deref())?;
            return Ok(Element::Playlist(playlist));
        }
        Ok(self.cache.get_element(&hit.uri, name))
    }
}
