//! Close-approach data infrastructure
//!
//! # Structure
//! - `types` - Tabular response, normalized rows, errors
//! - `query` - Kebab-case query construction with defaults and aliases
//! - `client` - HTTP client and the `CloseApproachSource` seam

pub mod client;
pub mod query;
pub mod types;

pub use client::{CadClient, CadFetched, CloseApproachSource};
pub use query::CadQuery;
pub use types::{CadError, CadNormalizedRow, CadResponse, normalize_rows};
