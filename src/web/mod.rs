//! The HTTP front end: the form page, the JSON API and static assets.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header::CONTENT_TYPE};
use axum::response::IntoResponse;
use tracing::{error, info};

use crate::generation::ClientStatus;
use crate::pipeline::Pipeline;

mod api;
pub(crate) mod prelude;
mod views;

use api::{generate_api_handler, labels_handler};
use views::{generate_form_handler, index_handler};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/generate", axum::routing::post(generate_form_handler))
        .route("/api/labels", axum::routing::get(labels_handler))
        .route("/api/generate", axum::routing::post(generate_api_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/healthz", axum::routing::get(health_handler))
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    match state.pipeline.status() {
        ClientStatus::Ready { .. } => (StatusCode::OK, "ok"),
        ClientStatus::Disabled { .. } => (StatusCode::SERVICE_UNAVAILABLE, "disabled"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Serves the app until ctrl-c.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    pipeline: Pipeline,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(AppState::new(pipeline));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
