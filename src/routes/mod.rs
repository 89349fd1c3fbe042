// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers and router assembly.

pub mod api;

use crate::middleware::{ensure_session, track_activity};
use crate::AppState;
use axum::http::{header, Method, StatusCode};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn unmatched() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Build the complete router: the host's storefront routes plus the
/// activity query API, with session context and activity tracking
/// layered over both. The tracking layer also covers unrouted requests
/// (recorded as `unknown`) and the query API itself (recorded as
/// `other`), matching the subsystem's observe-everything contract.
/// `/health` stays outside the tracked stack.
pub fn create_router(state: Arc<AppState>, storefront: Router<Arc<AppState>>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Session context runs first (outermost), then tracking. The
    // explicit fallback keeps unrouted requests inside the tracked
    // stack so they are recorded as `unknown`.
    let tracked = storefront
        .merge(api::routes())
        .fallback(unmatched)
        .layer(middleware::from_fn_with_state(state.clone(), track_activity))
        .layer(middleware::from_fn(ensure_session));

    Router::new()
        .route("/health", get(health_check))
        .merge(tracked)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
