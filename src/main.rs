mod api;
mod config;
mod emotion;

use axum::{
    routing::{get, post},
    Router,
};
use dotenv::dotenv;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::analyze_emotion,
        api::health
    ),
    components(
        schemas(
            api::ReflectionInput,
            api::ErrorResponse,
            api::HealthResponse,
            crate::emotion::Classification,
            crate::emotion::Emotion
        )
    ),
    tags(
        (name = "emotion", description = "Emotion Reflection API")
    )
)]
struct ApiDoc;

/// `POST /` is served alongside `POST /analyze` because the web client posts
/// reflections to the service root.
fn app(config: &Config) -> anyhow::Result<Router> {
    let cors = api::cors_layer(&config.cors_origins)?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", post(api::analyze_emotion))
        .route("/analyze", post(api::analyze_emotion))
        .route("/health", get(api::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Loaded {} emotion categories", emotion::keyword_table().len());
    let router = app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
    tracing::info!(cors = ?config.cors_origins, "Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
