// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storefront-Activity API Server
//!
//! Runs the activity-tracking subsystem against a small demo storefront
//! so the middleware, store and query API can be exercised end to end.

use axum::{
    extract::Path,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use storefront_activity::{config::Config, db::ActivityStore, routes, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Storefront-Activity API");

    // Open the activity database (directory and schema created on demand)
    let store = ActivityStore::open(&config.data_dir).expect("Failed to open activity store");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    // Build router
    let app = routes::create_router(state, demo_storefront());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Placeholder storefront routes so every classifier rule is reachable
/// from a running server. A real deployment mounts the host
/// application's handlers here instead.
fn demo_storefront() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/product/{id}", get(product))
        .route("/cart", get(view_cart).post(add_to_cart))
        .route("/cart/empty", post(empty_cart))
        .route("/cart/checkout", post(checkout))
        .route("/setCurrency", post(set_currency))
}

async fn home() -> &'static str {
    "storefront home"
}

async fn product(Path(id): Path<String>) -> String {
    format!("product {id}")
}

async fn view_cart() -> &'static str {
    "cart"
}

async fn add_to_cart() -> &'static str {
    "added to cart"
}

async fn empty_cart() -> &'static str {
    "cart emptied"
}

async fn checkout() -> &'static str {
    "order placed"
}

async fn set_currency() -> &'static str {
    "currency updated"
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront_activity=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
