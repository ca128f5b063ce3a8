//! NASA image library search with an in-memory cache
//!
//! Lookups are keyed by normalized query text with a fixed expiry. The cache
//! is read-then-write without transactional guarding: concurrent identical
//! lookups may both miss and re-fetch, which is idempotent, and the last
//! writer wins on population.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use utoipa::ToSchema;

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

static ASTEROID_TOPIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)asteroid|neo|near[- ]earth|small body").expect("pattern compiles"));

/// Best image match for a query.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageHit {
    pub title: Option<String>,
    pub thumb: Option<String>,
    pub original: Option<String>,
    pub credit: Option<String>,
    pub nasa_id: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageSearchResponse {
    pub ok: bool,
    pub hit: Option<ImageHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ImageSearchResponse {
    fn miss() -> Self {
        Self {
            ok: true,
            hit: None,
            source: None,
        }
    }
}

#[derive(Debug, Error)]
#[error("network error calling image service: {0}")]
pub struct ImagesError(#[from] reqwest::Error);

struct CacheEntry {
    expires: Instant,
    payload: ImageSearchResponse,
}

/// Client for the NASA images API with a time-bounded in-memory cache.
pub struct ImageSearchClient {
    base_url: String,
    http: Client,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl ImageSearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Search for the best image match, consulting the cache first. An empty
    /// query short-circuits to an empty hit without caching.
    pub async fn search(&self, query: &str) -> Result<ImageSearchResponse, ImagesError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(ImageSearchResponse::miss());
        }

        let key = query.to_lowercase();
        if let Some(entry) = self.cache.read().await.get(&key) {
            if entry.expires > Instant::now() {
                debug!(query = %key, "Image search cache hit");
                return Ok(entry.payload.clone());
            }
        }

        let payload = self.search_uncached(query).await?;
        self.cache.write().await.insert(
            key,
            CacheEntry {
                expires: Instant::now() + CACHE_TTL,
                payload: payload.clone(),
            },
        );
        Ok(payload)
    }

    async fn search_uncached(&self, query: &str) -> Result<ImageSearchResponse, ImagesError> {
        // Progressive retry: the literal query, an asteroid-scoped variant,
        // then the bare topic.
        let mut items = self.search_once(query).await?;
        if items.is_empty() {
            items = self.search_once(&format!("asteroid {query}")).await?;
        }
        if items.is_empty() {
            items = self.search_once("asteroid").await?;
        }
        if items.is_empty() {
            return Ok(ImageSearchResponse::miss());
        }

        let best = pick_best(&items);
        let data = best.pointer("/data/0").cloned().unwrap_or(Value::Null);
        let link = best.pointer("/links/0").cloned().unwrap_or(Value::Null);
        let nasa_id = value_str(&data, "nasa_id");

        // Asset resolution failures degrade to a missing original, not an
        // error for the whole lookup.
        let original = match &nasa_id {
            Some(id) => self.original_asset(id).await.ok().flatten(),
            None => None,
        };

        let hit = ImageHit {
            title: value_str(&data, "title"),
            thumb: value_str(&link, "href"),
            original,
            credit: value_str(&data, "secondary_creator").or_else(|| value_str(&data, "center")),
            nasa_id,
            page: value_str(best, "href"),
        };

        Ok(ImageSearchResponse {
            ok: true,
            hit: Some(hit),
            source: Some("images-api.nasa.gov".to_string()),
        })
    }

    /// One search call; a non-success status counts as no results.
    async fn search_once(&self, query: &str) -> Result<Vec<Value>, ImagesError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(url)
            .query(&[("media_type", "image"), ("q", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(Vec::new());
        }
        let body: Value = response.json().await?;
        Ok(body
            .pointer("/collection/items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Resolve the original-size asset URL for a NASA id.
    async fn original_asset(&self, nasa_id: &str) -> Result<Option<String>, ImagesError> {
        let url = format!("{}/asset/{nasa_id}", self.base_url.trim_end_matches('/'));
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: Value = response.json().await?;
        let hrefs: Vec<&str> = body
            .pointer("/collection/items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("href").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let original = hrefs
            .iter()
            .find(|h| h.to_lowercase().contains("orig."))
            .or_else(|| {
                hrefs.iter().find(|h| {
                    let lower = h.to_lowercase();
                    lower.ends_with(".jpg") || lower.ends_with(".png")
                })
            })
            .or_else(|| hrefs.first());
        Ok(original.map(|h| h.to_string()))
    }
}

/// Prefer items whose keywords or title indicate asteroid/NEO imagery; ties
/// keep the upstream order.
fn pick_best(items: &[Value]) -> &Value {
    let score = |item: &Value| -> i32 {
        let data = item.pointer("/data/0").cloned().unwrap_or(Value::Null);
        let title = value_str(&data, "title").unwrap_or_default();
        let keyword_hit = data
            .get("keywords")
            .and_then(Value::as_array)
            .is_some_and(|kws| {
                kws.iter()
                    .filter_map(Value::as_str)
                    .any(|k| ASTEROID_TOPIC.is_match(k))
            });

        let mut s = 0;
        if keyword_hit {
            s += 3;
        }
        if ASTEROID_TOPIC.is_match(&title) {
            s += 2;
        }
        s
    };

    let mut best = &items[0];
    let mut best_score = score(best);
    for item in &items[1..] {
        let s = score(item);
        if s > best_score {
            best = item;
            best_score = s;
        }
    }
    best
}

fn value_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}
