// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use storefront_activity::{config::Config, db::ActivityStore, routes::create_router, AppState};
use tempfile::TempDir;

/// Create a test app backed by a fresh on-disk store.
///
/// The returned `TempDir` owns the database directory and must be kept
/// alive for the lifetime of the app.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ActivityStore::open(dir.path()).expect("Failed to open activity store");

    let state = Arc::new(AppState {
        config: Config::default(),
        store,
    });

    (create_router(state.clone(), storefront()), state, dir)
}

/// Stub storefront covering every classifier rule, plus a failing
/// route for status-capture tests.
fn storefront() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route(
            "/product/{id}",
            get(|Path(id): Path<String>| async move { format!("product {id}") }),
        )
        .route("/cart", get(|| async { "cart" }).post(|| async { "added" }))
        .route("/cart/empty", post(|| async { "emptied" }))
        .route("/cart/checkout", post(|| async { "ordered" }))
        .route("/setCurrency", post(|| async { "currency set" }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
}
