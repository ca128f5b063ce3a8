use clap::Parser;
use perihelion::config::AppConfig;
use perihelion::infrastructure::model::OllamaClient;
use perihelion::infrastructure::server;
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "perihelion",
    version,
    about = "Close-approach chat gateway powered by Ollama"
)]
struct Cli {
    /// Path to gateway.toml; defaults are used when omitted and absent
    #[arg(long)]
    config: Option<String>,
    /// Overrides the configured Ollama endpoint
    #[arg(long)]
    ollama_url: Option<String>,
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("Starting perihelion gateway");

    let cli = Cli::parse();
    debug!(config = ?cli.config, addr = %cli.addr, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let mut config = AppConfig::load(config_path)?;
    if let Some(url) = cli.ollama_url {
        config.ollama_url = url;
    }
    info!(
        ollama_url = config.ollama_url.as_str(),
        model = config.default_model.as_str(),
        "Configuration loaded"
    );

    let provider = Arc::new(OllamaClient::new(config.ollama_url.clone()));
    server::serve(provider, &config, cli.addr).await?;

    info!("Gateway shut down");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
