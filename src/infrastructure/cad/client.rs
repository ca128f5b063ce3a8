//! Close-approach service HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::query::CadQuery;
use super::types::{CadError, CadResponse};

/// A source of close-approach data. The orchestrator depends on this seam so
/// tests can script fetch results without a network.
#[async_trait]
pub trait CloseApproachSource: Send + Sync {
    async fn close_approaches(&self, query: &CadQuery) -> Result<CadResponse, CadError>;
}

/// HTTP client for the JPL close-approach data API.
#[derive(Clone)]
pub struct CadClient {
    base_url: String,
    http: Client,
}

/// One raw fetch: the exact upstream URL issued and the body as received.
#[derive(Debug, Clone)]
pub struct CadFetched {
    pub upstream_url: String,
    pub body: Value,
}

impl CadClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Issue one request and return the body verbatim. A non-success status
    /// surfaces as a typed error carrying the status and raw body; an empty
    /// result set is never substituted.
    pub async fn fetch_raw(&self, query: &CadQuery) -> Result<CadFetched, CadError> {
        let request = self
            .http
            .get(&self.base_url)
            .query(query.pairs())
            .build()?;
        let upstream_url = request.url().to_string();
        info!(url = %upstream_url, "Fetching close-approach data");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CadError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        debug!(url = %upstream_url, "Close-approach fetch succeeded");
        Ok(CadFetched { upstream_url, body })
    }
}

#[async_trait]
impl CloseApproachSource for CadClient {
    async fn close_approaches(&self, query: &CadQuery) -> Result<CadResponse, CadError> {
        let fetched = self.fetch_raw(query).await?;
        serde_json::from_value(fetched.body).map_err(CadError::InvalidResponse)
    }
}
