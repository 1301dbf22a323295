#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Method;
use serde_json::{Value, json};
use spotcache::{Cache, CacheOptions, Error, Result, spotify::Transport};

/// In-memory transport answering from a routing table and recording every call.
///
/// Routes are keyed by the endpoint path (everything before `?`). Pages can be
/// routed per offset with [`ScriptedTransport::page`], and [`ScriptedTransport::empty`]
/// answers like a `204 No Content`.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Option<Value>>>,
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn route(self, path: &str, response: Value) -> Self {
        self.set(path, response);
        self
    }

    pub fn page(self, path: &str, offset: usize, response: Value) -> Self {
        self.set(&format!("{}@{}", path, offset), response);
        self
    }

    pub fn empty(self, path: &str) -> Self {
        self.routes.lock().insert(path.to_string(), None);
        self
    }

    pub fn set(&self, path: &str, response: Value) {
        self.routes.lock().insert(path.to_string(), Some(response));
    }

    /// Endpoints requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|call| call.endpoint.clone()).collect()
    }

    pub fn requests(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn lookup(&self, endpoint: &str) -> Option<Option<Value>> {
        let (path, query) = endpoint.split_once('?').unwrap_or((endpoint, ""));
        let offset = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("offset="));

        let routes = self.routes.lock();
        offset
            .and_then(|offset| routes.get(&format!("{}@{}", path, offset)))
            .or_else(|| routes.get(path))
            .cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        self.calls.lock().push(Call {
            method,
            endpoint: endpoint.to_string(),
            body,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lookup(endpoint)
            .ok_or_else(|| Error::NotFound(endpoint.to_string()))
    }
}

pub fn memory_cache(transport: &Arc<ScriptedTransport>) -> Arc<Cache> {
    Cache::new(transport.clone(), CacheOptions::default())
}

pub fn disk_cache(transport: &Arc<ScriptedTransport>, dir: &std::path::Path) -> Arc<Cache> {
    Cache::new(
        transport.clone(),
        CacheOptions::default().with_cache_dir(dir),
    )
}

pub fn track_json(id: &str, name: &str) -> Value {
    json!({
        "uri": format!("spotify:track:{}", id),
        "name": name,
        "duration_ms": 215000,
        "album": { "uri": "spotify:album:alb1", "name": "Album One" },
        "artists": [
            { "uri": "spotify:artist:art1", "name": "Artist One" },
            { "uri": "spotify:artist:art2", "name": "Artist Two" }
        ]
    })
}

pub fn playlist_item(index: usize) -> Value {
    json!({
        "added_at": "2024-03-01T12:00:00Z",
        "track": {
            "uri": format!("spotify:track:item{}", index),
            "name": format!("Song {}", index)
        }
    })
}

pub fn playlist_items(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(playlist_item).collect()
}
