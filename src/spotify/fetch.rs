use reqwest::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{Error, Result},
    spotify::Transport,
    utils,
};

/// Maximum page size accepted by the playlist items endpoint.
pub const MAX_PLAYLIST_PAGE: u32 = 100;
/// Maximum page size accepted by every other collection endpoint.
pub const MAX_PAGE: u32 = 50;

/// Describes the network calls needed to materialize one entity.
///
/// A request consists of one base `GET` plus any number of paginated
/// collections. The description is a pure value: building it never touches the
/// network, and [`execute`] is the only place where calls are issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub endpoint: String,
    pub fields: Option<String>,
    pub collections: Vec<PagedCollection>,
}

/// A collection-valued field that has to be stitched together from pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedCollection {
    /// Key under which the stitched `{ "items": [...] }` is stored.
    pub key: &'static str,
    /// Endpoint serving the follow-up pages.
    pub endpoint: String,
    pub fields: Option<String>,
    pub limit: u32,
    /// Whether the first page is embedded in the base response under `key`.
    pub embedded: bool,
}

impl FetchRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            fields: None,
            collections: Vec::new(),
        }
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn collection(mut self, collection: PagedCollection) -> Self {
        self.collections.push(collection);
        self
    }
}

impl PagedCollection {
    /// A collection whose pages all come from `endpoint`, starting at offset 0.
    pub fn separate(key: &'static str, endpoint: impl Into<String>, limit: u32) -> Self {
        Self {
            key,
            endpoint: endpoint.into(),
            fields: None,
            limit: limit.clamp(1, MAX_PAGE),
            embedded: false,
        }
    }

    /// A collection whose first page is part of the base response.
    pub fn embedded(key: &'static str, endpoint: impl Into<String>, limit: u32) -> Self {
        Self {
            embedded: true,
            ..Self::separate(key, endpoint, limit)
        }
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Overrides the page size ceiling for endpoints that allow larger pages.
    pub fn max_limit(mut self, requested: u32, max: u32) -> Self {
        self.limit = requested.clamp(1, max);
        self
    }
}

/// Issues the calls described by `request` and returns the combined document.
///
/// Every collection ends up as `{ "items": [...] }` under its key, in API
/// response order. Pages are requested with an offset equal to the number of
/// items collected so far until a page reports no `next` page.
///
/// # Errors
///
/// - Transport errors are propagated unchanged.
/// - An empty or non-object response, or a page without `items`, yields
///   [`Error::DataShape`].
pub async fn execute(request: &FetchRequest, transport: &dyn Transport) -> Result<Value> {
    let endpoint = utils::endpoint_with_params(
        &request.endpoint,
        &[("fields", request.fields.as_deref())],
    );
    let base = transport
        .request(Method::GET, &endpoint, None)
        .await?
        .ok_or_else(|| Error::DataShape(format!("empty response from {}", request.endpoint)))?;

    let Value::Object(mut document) = base else {
        return Err(Error::DataShape(format!(
            "response from {} is not an object",
            request.endpoint
        )));
    };

    for collection in &request.collections {
        let items = collect_pages(collection, &document, transport).await?;
        debug!(
            "collected {} items for {} of {}",
            items.len(),
            collection.key,
            request.endpoint
        );
        let mut page = Map::new();
        page.insert("items".to_string(), Value::Array(items));
        document.insert(collection.key.to_string(), Value::Object(page));
    }

    Ok(Value::Object(document))
}

async fn collect_pages(
    collection: &PagedCollection,
    document: &Map<String, Value>,
    transport: &dyn Transport,
) -> Result<Vec<Value>> {
    let mut items = Vec::new();

    let mut has_next = if collection.embedded {
        let first = document.get(collection.key).ok_or_else(|| {
            Error::DataShape(format!("missing embedded page '{}'", collection.key))
        })?;
        absorb_page(first, &mut items)?
    } else {
        true
    };

    let limit = collection.limit.to_string();
    while has_next {
        let offset = items.len().to_string();
        let endpoint = utils::endpoint_with_params(
            &collection.endpoint,
            &[
                ("offset", Some(offset.as_str())),
                ("limit", Some(limit.as_str())),
                ("fields", collection.fields.as_deref()),
            ],
        );
        let page = transport
            .request(Method::GET, &endpoint, None)
            .await?
            .ok_or_else(|| Error::DataShape(format!("empty page from {}", collection.endpoint)))?;

        let before = items.len();
        has_next = absorb_page(&page, &mut items)?;
        if items.len() == before {
            // a page without items cannot advance the offset
            break;
        }
    }

    Ok(items)
}

fn absorb_page(page: &Value, items: &mut Vec<Value>) -> Result<bool> {
    let page_items = page
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::DataShape("page without items".to_string()))?;
    items.extend(page_items.iter().cloned());

    Ok(page.get("next").is_some_and(|next| !next.is_null()))
}
