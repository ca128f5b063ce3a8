//! NASA NeoWs browse client

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum NeoWsError {
    #[error("network error calling NeoWs: {0}")]
    Network(#[from] reqwest::Error),
    #[error("NeoWs returned status {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl NeoWsError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NeoWsError::Upstream { status, .. } => Some(*status),
            NeoWsError::Network(source) => source.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NeoWsBrowse {
    pub ok: bool,
    pub page: u32,
    pub size: u32,
    pub source: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

/// Paged browse over the NeoWs near-Earth object catalogue.
#[derive(Clone)]
pub struct NeoWsClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl NeoWsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }

    pub async fn browse(&self, page: u32, size: u32) -> Result<NeoWsBrowse, NeoWsError> {
        let url = format!("{}/neo/browse", self.base_url.trim_end_matches('/'));
        info!(page, size, "Browsing NeoWs catalogue");

        let response = self
            .http
            .get(url)
            .query(&[
                ("page", page.to_string()),
                ("size", size.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NeoWsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let data = body
            .get("near_earth_objects")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(NeoWsBrowse {
            ok: true,
            page,
            size,
            source: "NASA NeoWs".to_string(),
            data,
        })
    }
}
