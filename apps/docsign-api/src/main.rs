//! DocSign API Server - places signature images on PDFs
//!
//! Provides REST endpoints for:
//! - PDF upload
//! - Signature placement
//! - Signed document delivery

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod handlers;
mod models;
mod state;
mod store;


use config::Config;
use state::AppState;

/// Build the router over shared state
pub fn app(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/pdf/upload", post(handlers::upload))
        .route("/api/pdf/sign", post(handlers::sign))
        .route("/api/pdf/download/:id", get(handlers::download))
        .route("/api/pdf/:id", get(handlers::get_document))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::parse();

    let level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("docsign_api={}", level).parse()?)
                .add_directive(format!("docsign_core={}", level).parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing DocSign API...");
    let state = Arc::new(AppState::new(&config)?);
    let app = app(state, config.max_body_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting DocSign API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
