use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::weather::WeatherLookup;

/// Full application: the API under `/api` with open CORS. A panicking
/// handler answers with the generic 500 envelope.
pub fn app(lookup: Arc<WeatherLookup>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(lookup))
        .layer(CatchPanicLayer::custom(api::handle_panic))
        .layer(cors)
}

pub async fn run(host: &str, port: u16, lookup: Arc<WeatherLookup>) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app(lookup))
        .await
        .context("Web server stopped")?;
    Ok(())
}
