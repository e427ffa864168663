use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};

use super::error::CatalogError;

// ---------------------------------------------------------------------------
// CatalogItem – one STAC item as returned by a search
// ---------------------------------------------------------------------------

/// An item from the catalog. Read-only; the catalog owns the data.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub properties: Map<String, JsonValue>,
}

/// Anything that can list every item of a collection.
pub trait CatalogClient {
    /// Catalog URL exactly as configured, used to build browser links.
    /// `None` when the items have no browsable catalog.
    fn base_url(&self) -> Option<&str>;

    /// Every item of the collection, in catalog order.
    fn search_collection(&self, collection_id: &str) -> Result<Vec<CatalogItem>, CatalogError>;
}

// ---------------------------------------------------------------------------
// Page decoding
// ---------------------------------------------------------------------------

/// The parts of a STAC `ItemCollection` page we need.
#[derive(Debug, Deserialize)]
struct ItemPage {
    #[serde(default)]
    features: Vec<JsonValue>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Clone, Deserialize)]
struct Link {
    rel: String,
    href: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    body: Option<JsonValue>,
}

/// How to ask for the next page of a search.
#[derive(Debug, Clone, PartialEq)]
enum NextPage {
    Get(String),
    Post(String, JsonValue),
}

impl NextPage {
    fn url(&self) -> &str {
        match self {
            NextPage::Get(url) | NextPage::Post(url, _) => url,
        }
    }

    /// Method, URL and body, for spotting a request that was already sent.
    fn fingerprint(&self) -> String {
        match self {
            NextPage::Get(url) => format!("GET {url}"),
            NextPage::Post(url, body) => format!("POST {url} {body}"),
        }
    }
}

/// Turn one feature into a [`CatalogItem`]. `index` is the position in the
/// whole result, not in the page.
fn decode_item(index: usize, feature: &JsonValue) -> Result<CatalogItem, CatalogError> {
    let obj = feature
        .as_object()
        .ok_or_else(|| CatalogError::MalformedItem {
            index,
            reason: "feature is not a JSON object".into(),
        })?;

    let id = match obj.get("id") {
        Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
        Some(JsonValue::String(_)) => {
            return Err(CatalogError::MalformedItem {
                index,
                reason: "empty 'id'".into(),
            });
        }
        Some(_) => {
            return Err(CatalogError::MalformedItem {
                index,
                reason: "'id' is not a string".into(),
            });
        }
        None => {
            return Err(CatalogError::MalformedItem {
                index,
                reason: "missing 'id'".into(),
            });
        }
    };

    let properties = match obj.get("properties") {
        Some(JsonValue::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    Ok(CatalogItem { id, properties })
}

/// Decode a page body, appending its items to `out`. Returns the request for
/// the following page, if the server advertised one.
fn decode_page(
    body: JsonValue,
    out: &mut Vec<CatalogItem>,
    previous_body: &JsonValue,
) -> Result<Option<NextPage>, CatalogError> {
    let page: ItemPage = serde_json::from_value(body)
        .map_err(|e| CatalogError::unavailable(format!("not an item collection: {e}")))?;

    for feature in &page.features {
        let item = decode_item(out.len(), feature)?;
        out.push(item);
    }

    let next = page.links.into_iter().find(|l| l.rel == "next").map(|link| {
        let is_post = link
            .method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("POST"));
        if is_post {
            // STAC lets `body` be a partial update of the previous request.
            let mut merged = previous_body.clone();
            if let (Some(target), Some(JsonValue::Object(patch))) =
                (merged.as_object_mut(), link.body)
            {
                target.extend(patch);
            }
            NextPage::Post(link.href, merged)
        } else {
            NextPage::Get(link.href)
        }
    });

    // An empty page ends the search even if it points onward.
    if page.features.is_empty() {
        return Ok(None);
    }
    Ok(next)
}

// ---------------------------------------------------------------------------
// HTTP catalog (STAC API)
// ---------------------------------------------------------------------------

/// A STAC API reached over HTTP. Blocking: the viewer waits for the whole
/// search before drawing again.
#[derive(Debug)]
pub struct HttpCatalog {
    client: Client,
    /// URL as configured, for browser links.
    link_base: String,
    /// Same URL without a trailing `/`, for requests.
    base_url: String,
    page_size: usize,
}

impl HttpCatalog {
    pub fn new(base_url: &str, page_size: usize, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpCatalog {
            client,
            link_base: base_url.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
        })
    }

    fn get_json(&self, url: &str) -> Result<JsonValue, CatalogError> {
        debug!("GET {url}");
        let body = self.client.get(url).send()?.error_for_status()?.json()?;
        Ok(body)
    }

    fn post_json(&self, url: &str, payload: &JsonValue) -> Result<JsonValue, CatalogError> {
        debug!("POST {url} {payload}");
        let body = self
            .client
            .post(url)
            .json(payload)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(body)
    }

    /// Outer rings (as `[lon, lat]` pairs) of an item's polygon geometry.
    /// Used to outline the watershed on the maps.
    pub fn fetch_item_geometry(
        &self,
        collection_id: &str,
        item_id: &str,
    ) -> Result<Vec<Vec<[f64; 2]>>, CatalogError> {
        let url = format!(
            "{}/collections/{collection_id}/items/{item_id}",
            self.base_url
        );
        let item = self.get_json(&url)?;
        Ok(outer_rings(item.get("geometry").unwrap_or(&JsonValue::Null)))
    }
}

impl CatalogClient for HttpCatalog {
    fn base_url(&self) -> Option<&str> {
        Some(&self.link_base)
    }

    fn search_collection(&self, collection_id: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let mut items = Vec::new();
        let mut body = json!({
            "collections": [collection_id],
            "limit": self.page_size,
        });
        let mut next = Some(NextPage::Post(format!("{}/search", self.base_url), body.clone()));
        let mut pages = 0usize;
        let mut sent = HashSet::new();

        while let Some(request) = next.take() {
            if !sent.insert(request.fingerprint()) {
                return Err(CatalogError::unavailable(format!(
                    "next link repeats after {pages} pages: {}",
                    request.url()
                )));
            }
            let page = match &request {
                NextPage::Get(url) => self.get_json(url)?,
                NextPage::Post(url, payload) => {
                    body = payload.clone();
                    self.post_json(url, payload)?
                }
            };
            pages += 1;
            next = decode_page(page, &mut items, &body)?;
            debug!("page {pages}: {} items so far", items.len());
        }

        Ok(items)
    }
}

/// Outer rings of a GeoJSON Polygon or MultiPolygon; anything else is empty.
pub fn outer_rings(geometry: &JsonValue) -> Vec<Vec<[f64; 2]>> {
    fn ring(value: &JsonValue) -> Option<Vec<[f64; 2]>> {
        value
            .as_array()?
            .iter()
            .map(|pos| {
                let pos = pos.as_array()?;
                Some([pos.first()?.as_f64()?, pos.get(1)?.as_f64()?])
            })
            .collect()
    }

    let coords = geometry.get("coordinates");
    match geometry.get("type").and_then(JsonValue::as_str) {
        Some("Polygon") => coords
            .and_then(|c| c.get(0))
            .and_then(ring)
            .into_iter()
            .collect(),
        Some("MultiPolygon") => coords
            .and_then(JsonValue::as_array)
            .map(|polys| {
                polys
                    .iter()
                    .filter_map(|p| p.get(0).and_then(ring))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// File catalog (offline snapshot)
// ---------------------------------------------------------------------------

/// A STAC `ItemCollection` saved as a GeoJSON file.
///
/// Features carrying a `collection` member only match that collection;
/// features without one match any requested id. A snapshot is not a
/// browsable catalog, so its records carry no link.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: &Path) -> Self {
        FileCatalog {
            path: path.to_path_buf(),
        }
    }
}

impl CatalogClient for FileCatalog {
    fn base_url(&self) -> Option<&str> {
        None
    }

    fn search_collection(&self, collection_id: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            CatalogError::unavailable(format!("reading {}: {e}", self.path.display()))
        })?;
        let mut root: JsonValue = serde_json::from_str(&text).map_err(|e| {
            CatalogError::unavailable(format!("parsing {}: {e}", self.path.display()))
        })?;

        if let Some(features) = root.get_mut("features").and_then(JsonValue::as_array_mut) {
            features.retain(|f| match f.get("collection").and_then(JsonValue::as_str) {
                Some(c) => c == collection_id,
                None => true,
            });
        }
        // Snapshots are a single page; `next` links are ignored.
        if let Some(obj) = root.as_object_mut() {
            obj.remove("links");
        }

        let mut items = Vec::new();
        decode_page(root, &mut items, &JsonValue::Null)?;
        Ok(items)
    }
}
