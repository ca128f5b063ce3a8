mod error;
mod loader;

pub use error::ConfigError;

use std::path::Path;

/// Gateway configuration loaded from gateway.toml with environment overrides
/// (`OLLAMA_URL`, `NASA_API_KEY`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ollama_url: String,
    pub default_model: String,
    pub cad_api_url: String,
    pub images_api_url: String,
    pub neows_api_url: String,
    pub nasa_api_key: String,
}

impl AppConfig {
    /// Load configuration from a file path (or the default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        loader::load_config(path)
    }
}
