//! HTTP endpoint.
//!
//! One route, `POST /generate_mcq/`, behind an open CORS policy (any origin,
//! method and header: the endpoint is not a security boundary) and
//! `tower-http` request tracing.

pub mod routes;
pub mod state;

use crate::config::ServerConfig;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::future::Future;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate_mcq/", post(routes::generate_mcq))
        .route("/generate_mcq", post(routes::generate_mcq))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(state: AppState, config: &ServerConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state, config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("MCQ server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
