//! Close-approach result compaction
//!
//! Bounds and unit-normalizes a raw tabular result set into the small summary
//! fed back into the model. Truncation keeps the first `max` rows in upstream
//! order; `total` always reflects the upstream-reported count.

use crate::domain::units::{AU_KM, LD_AU};
use crate::infrastructure::cad::CadResponse;
use crate::infrastructure::cad::types::cell_f64;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// One compacted close-approach record.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompactItem {
    pub des: String,
    pub cd: String,
    pub dist_au: f64,
    /// Kilometres, rounded to the nearest whole unit
    pub dist_km: f64,
    /// Lunar distances, two decimal places
    pub dist_ld: f64,
    /// Relative velocity in km/s, two decimal places
    pub v_rel_kms: f64,
    /// Absolute magnitude; absent upstream values stay null, never zero
    pub h: Option<f64>,
}

/// Bounded, model-consumable summary of a close-approach result set.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompactResult {
    pub total: u64,
    pub returned: usize,
    pub items: Vec<CompactItem>,
}

/// Compact a raw result set down to at most `max` items.
pub fn compact(response: &CadResponse, max: usize) -> CompactResult {
    let i_des = response.field_index("des");
    let i_cd = response.field_index("cd");
    let i_dist = response.field_index("dist");
    let i_vrel = response.field_index("v_rel");
    let i_h = response.field_index("h");

    let items: Vec<CompactItem> = response
        .data
        .iter()
        .take(max)
        .map(|row| {
            let dist_au = cell_f64(row, i_dist).unwrap_or(f64::NAN);
            CompactItem {
                des: cell_string(row, i_des),
                cd: cell_string(row, i_cd),
                dist_au,
                dist_km: (dist_au * AU_KM).round(),
                dist_ld: round2(dist_au / LD_AU),
                v_rel_kms: round2(cell_f64(row, i_vrel).unwrap_or(f64::NAN)),
                h: cell_f64(row, i_h),
            }
        })
        .collect();

    CompactResult {
        total: response.total(),
        returned: items.len(),
        items,
    }
}

fn cell_string(row: &[Value], index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
