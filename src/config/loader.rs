use super::AppConfig;
use super::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "gateway.toml";

pub(crate) const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub(crate) const DEFAULT_MODEL: &str = "llama3.2";
pub(crate) const DEFAULT_CAD_API_URL: &str = "https://ssd-api.jpl.nasa.gov/cad.api";
pub(crate) const DEFAULT_IMAGES_API_URL: &str = "https://images-api.nasa.gov";
pub(crate) const DEFAULT_NEOWS_API_URL: &str = "https://api.nasa.gov/neo/rest/v1";
pub(crate) const DEFAULT_NASA_API_KEY: &str = "DEMO_KEY";

/// On-disk shape of gateway.toml; every field is optional and falls back to
/// the built-in defaults, then environment overrides are applied on top.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawConfig {
    pub ollama_url: Option<String>,
    pub default_model: Option<String>,
    pub cad_api_url: Option<String>,
    pub images_api_url: Option<String>,
    pub neows_api_url: Option<String>,
    pub nasa_api_key: Option<String>,
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let raw = match path {
        Some(path) => read_raw(path, true)?,
        None => read_raw(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };

    let mut config = AppConfig {
        ollama_url: raw
            .ollama_url
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
        default_model: raw.default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        cad_api_url: raw
            .cad_api_url
            .unwrap_or_else(|| DEFAULT_CAD_API_URL.to_string()),
        images_api_url: raw
            .images_api_url
            .unwrap_or_else(|| DEFAULT_IMAGES_API_URL.to_string()),
        neows_api_url: raw
            .neows_api_url
            .unwrap_or_else(|| DEFAULT_NEOWS_API_URL.to_string()),
        nasa_api_key: raw
            .nasa_api_key
            .unwrap_or_else(|| DEFAULT_NASA_API_KEY.to_string()),
    };

    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

fn read_raw(path: &Path, required: bool) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        if required {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "No configuration file; using defaults");
        return Ok(RawConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            config.ollama_url = url;
        }
    }
    if let Ok(key) = env::var("NASA_API_KEY") {
        if !key.trim().is_empty() {
            config.nasa_api_key = key;
        }
    }
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let fields = [
        ("ollama_url", &config.ollama_url),
        ("default_model", &config.default_model),
        ("cad_api_url", &config.cad_api_url),
        ("images_api_url", &config.images_api_url),
        ("neows_api_url", &config.neows_api_url),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyField { field });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(tag: &str, contents: &str) -> std::path::PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("gateway-{tag}-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        path
    }

    #[test]
    fn missing_optional_file_falls_back_to_defaults() {
        let config = load_config(None).expect("defaults load");
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.cad_api_url, DEFAULT_CAD_API_URL);
        assert_eq!(config.nasa_api_key, DEFAULT_NASA_API_KEY);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/gateway.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn file_values_override_defaults() {
        let path = write_temp_config(
            "override",
            r#"
            ollama_url = "http://ollama.internal:11434"
            default_model = "llama3.1"
            "#,
        );
        let config = load_config(Some(&path)).expect("config loads");
        fs::remove_file(&path).ok();

        assert_eq!(config.ollama_url, "http://ollama.internal:11434");
        assert_eq!(config.default_model, "llama3.1");
        assert_eq!(config.cad_api_url, DEFAULT_CAD_API_URL);
    }

    #[test]
    fn empty_url_in_file_is_rejected() {
        let path = write_temp_config("empty-url", r#"cad_api_url = """#);
        let result = load_config(Some(&path));
        fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(ConfigError::EmptyField {
                field: "cad_api_url"
            })
        ));
    }
}
