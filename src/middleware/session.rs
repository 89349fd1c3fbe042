// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context middleware.
//!
//! The tracking middleware reads a session identifier and a request
//! identifier from request extensions. This module owns those types so
//! the subsystem never imports the host application's context types;
//! `ensure_session` is the bridge a host can mount to populate them
//! from its cookie-based session mechanism.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

/// Cookie holding the browsing session identifier.
pub const SESSION_COOKIE: &str = "shop_session-id";

/// Opaque per-session identifier.
///
/// Must be present in request extensions before `track_activity` runs.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Opaque per-request identifier, unique per request.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Ensure every request carries session and request identifiers.
///
/// Reuses the session cookie when present, otherwise mints a fresh
/// session and sets the cookie on the response. The identifiers are
/// opaque strings; no format validation is done on an existing cookie.
pub async fn ensure_session(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let (session_id, new_session) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), false),
        None => (Uuid::new_v4().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));
    request
        .extensions_mut()
        .insert(RequestId(Uuid::new_v4().to_string()));

    let response = next.run(request).await;

    if new_session {
        let jar = jar.add(Cookie::build((SESSION_COOKIE, session_id)).path("/"));
        (jar, response).into_response()
    } else {
        response
    }
}
