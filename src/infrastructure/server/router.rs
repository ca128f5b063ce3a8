use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::application::Orchestrator;
use crate::config::AppConfig;
use crate::infrastructure::cad::CadClient;
use crate::infrastructure::images::ImageSearchClient;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::neows::NeoWsClient;
use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(super) async fn serve<P>(
    provider: Arc<P>,
    config: &AppConfig,
    addr: SocketAddr,
) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    let api = ApiDoc::openapi();
    info!(%addr, "Binding gateway server");

    let cad = Arc::new(CadClient::new(config.cad_api_url.clone()));
    let images = Arc::new(ImageSearchClient::new(config.images_api_url.clone()));
    let neows = Arc::new(NeoWsClient::new(
        config.neows_api_url.clone(),
        config.nasa_api_key.clone(),
    ));
    let orchestrator = Orchestrator::new(provider, cad.clone(), config.default_model.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let state = Arc::new(ServerState::new(orchestrator, cad, images, neows));
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", api))
        .route("/api/chat", post(routes::chat::chat_handler::<P>))
        .route("/api/tools/cad", get(routes::cad::cad_handler::<P>))
        .route(
            "/api/tools/images/search",
            get(routes::images::images_handler::<P>),
        )
        .route(
            "/api/tools/neows/browse",
            get(routes::neows::neows_browse_handler::<P>),
        )
        .layer(cors)
        .with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "Gateway ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
