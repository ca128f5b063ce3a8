//! Close-approach service types

use crate::domain::units::{AU_KM, AU_TO_LD};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Tabular response from the close-approach service.
///
/// `fields` names the columns and `data` holds one value tuple per approach,
/// aligned to field order. Column order is a service contract that may change
/// between calls, so consumers resolve indices by name, never by position.
#[derive(Debug, Clone, Deserialize)]
pub struct CadResponse {
    /// Upstream-reported total; the service encodes it as a string or a
    /// number depending on the query shape.
    #[serde(default, deserialize_with = "flexible_count")]
    pub count: Option<u64>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl CadResponse {
    /// Index of a named column, if present.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Upstream total, falling back to the row count when absent.
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.data.len() as u64)
    }
}

fn flexible_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// One row of the normalized close-approach listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CadNormalizedRow {
    pub key: String,
    pub des: String,
    pub cd: String,
    pub dist_au: Option<f64>,
    pub dist_ld: Option<f64>,
    pub dist_km: Option<f64>,
    pub v_rel_kms: Option<f64>,
    #[serde(rename = "H")]
    pub h: Option<f64>,
}

/// Map raw rows into named, unit-converted records by field-name lookup.
pub fn normalize_rows(response: &CadResponse) -> Vec<CadNormalizedRow> {
    let i_des = response.field_index("des");
    let i_cd = response.field_index("cd");
    let i_dist = response.field_index("dist");
    let i_vrel = response.field_index("v_rel");
    let i_h = response.field_index("h");

    response
        .data
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let des = cell_str(row, i_des).unwrap_or_else(|| "—".to_string());
            let cd = cell_str(row, i_cd).unwrap_or_else(|| "—".to_string());
            let dist_au = cell_f64(row, i_dist);
            CadNormalizedRow {
                key: format!("{i}-{des}"),
                des,
                cd,
                dist_au,
                dist_ld: dist_au.map(|d| d * AU_TO_LD),
                dist_km: dist_au.map(|d| d * AU_KM),
                v_rel_kms: cell_f64(row, i_vrel),
                h: cell_f64(row, i_h),
            }
        })
        .collect()
}

/// Cell accessor tolerant of missing columns and null values.
fn cell(row: &[Value], index: Option<usize>) -> Option<&Value> {
    index.and_then(|i| row.get(i)).filter(|v| !v.is_null())
}

fn cell_str(row: &[Value], index: Option<usize>) -> Option<String> {
    cell(row, index).and_then(Value::as_str).map(str::to_string)
}

/// The service encodes numerics as strings; accept either.
pub(crate) fn cell_f64(row: &[Value], index: Option<usize>) -> Option<f64> {
    match cell(row, index)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Close-approach service errors
#[derive(Debug, Error)]
pub enum CadError {
    #[error("network error calling close-approach service: {0}")]
    Network(#[from] reqwest::Error),
    #[error("close-approach service returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("close-approach service returned invalid response: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

impl CadError {
    /// Upstream HTTP status when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            CadError::Upstream { status, .. } => Some(*status),
            CadError::Network(source) => source.status().map(|s| s.as_u16()),
            CadError::InvalidResponse(_) => None,
        }
    }
}
