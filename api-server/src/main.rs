//! DISPRE API Server
//!
//! REST front end for the multi-hazard disaster prediction engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DISPRE API                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌───────────────────────┐ │
//! │  │  Router   │→ │  Validation  │→ │  spawn_blocking       │ │
//! │  │  (Axum)   │  │  (validator) │  │  (CPU-bound engine)   │ │
//! │  └───────────┘  └──────────────┘  └───────────┬───────────┘ │
//! │                                               ▼             │
//! │                                    ┌────────────────────┐   │
//! │                                    │  DisasterEngine    │   │
//! │                                    │  seismic/flood/    │   │
//! │                                    │  tsunami models    │   │
//! │                                    └────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use dispre_core::DisasterEngine;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dispre_api=debug,dispre_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("DISPRE API Server starting ({})...", config.environment);

    let engine = Arc::new(DisasterEngine::new(config.engine()?).context("building engine")?);

    if let Some(dir) = &config.model_dir {
        if dir.exists() {
            match engine.load_models(dir) {
                Ok(()) => tracing::info!("Loaded saved models from {}", dir.display()),
                Err(e) => tracing::warn!("Could not load models from {}: {}", dir.display(), e),
            }
        }
    }

    if config.train_on_startup && !engine.is_trained() {
        tracing::info!("Training models before serving...");
        let trainer = Arc::clone(&engine);
        let reports = tokio::task::spawn_blocking(move || trainer.train_all()).await??;
        for report in &reports {
            tracing::info!(
                hazard = %report.hazard,
                r_squared = report.r_squared,
                duration_ms = report.duration_ms,
                "Model trained"
            );
        }
    }

    let state = AppState {
        engine,
        config: config.clone(),
    };
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DisasterEngine>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let predict_routes = Router::new()
        .route("/api/v1/predict/earthquake", post(handlers::predict::earthquake))
        .route("/api/v1/predict/flood", post(handlers::predict::flood))
        .route("/api/v1/predict/tsunami", post(handlers::predict::tsunami))
        .route("/api/v1/predict/all", post(handlers::predict::all))
        .route("/api/v1/predict/region", post(handlers::predict::region));

    let model_routes = Router::new()
        .route("/api/v1/models/train", post(handlers::models::train))
        .route("/api/v1/models/status", get(handlers::models::status));

    Router::new()
        .route("/", get(handlers::health::info))
        .route("/health", get(handlers::health::check))
        .merge(predict_routes)
        .merge(model_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
