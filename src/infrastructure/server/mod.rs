mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;
mod stream;

pub use error::ServerError;

use crate::config::AppConfig;
use crate::infrastructure::model::ModelProvider;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn serve<P>(
    provider: Arc<P>,
    config: &AppConfig,
    addr: SocketAddr,
) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    router::serve(provider, config, addr).await
}
