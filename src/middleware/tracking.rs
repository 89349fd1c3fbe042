// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity tracking middleware.
//!
//! Observes every request: classifies it from the matched route
//! template, runs the wrapped handler, finalizes the record with the
//! response status and type-specific details, and persists it. A failed
//! write is logged and never alters the response.

use crate::classify::{classify, extract_details};
use crate::error::AppError;
use crate::middleware::session::{RequestId, SessionId};
use crate::models::{ActivityRecord, ActivityType};
use crate::AppState;
use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Cookie holding the user's display currency.
pub const CURRENCY_COOKIE: &str = "currency";

const DEFAULT_CURRENCY: &str = "USD";

/// Record one activity per request.
///
/// Session and request identifiers must already be in the request
/// extensions (see `middleware::session`); their absence is a wiring
/// bug in the host application, not a runtime condition, so it panics.
pub async fn track_activity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let session_id = request
        .extensions()
        .get::<SessionId>()
        .expect("session middleware must run before activity tracking")
        .0
        .clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .expect("session middleware must run before activity tracking")
        .0
        .clone();

    let user_currency = jar
        .get(CURRENCY_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    // `MatchedPath` is absent when no registered route resolved the
    // request, which classifies as `unknown` rather than `other`.
    let route_template = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());
    let activity_type = classify(request.method(), route_template.as_deref());

    let path = request.uri().path().to_string();
    let path_params = match route_template.as_deref() {
        Some(template) => path_variables(template, &path),
        None => HashMap::new(),
    };

    let mut activity = ActivityRecord {
        id: 0,
        session_id,
        request_id,
        activity_type,
        path,
        method: request.method().to_string(),
        status_code: 0,
        user_currency,
        details: None,
        created_at: Utc::now(),
    };

    // Form-reading activity types need the body twice: once here for
    // detail fields and once in the wrapped handler. Buffer it and
    // hand the handler an identical request.
    let (request, form) = if reads_form(activity_type) {
        match buffer_form(request).await {
            Ok(buffered) => buffered,
            Err(response) => return response,
        }
    } else {
        (request, HashMap::new())
    };

    let response = next.run(request).await;

    activity.status_code = response.status().as_u16();

    let details = extract_details(activity_type, &form, &path_params);
    if !details.is_empty() {
        match serde_json::to_string(&details) {
            Ok(encoded) => activity.details = Some(encoded),
            Err(err) => tracing::warn!(error = %err, "Failed to encode activity details"),
        }
    }

    if let Err(err) = state.store.record(&activity) {
        tracing::warn!(error = %err, "Failed to record activity");
    }

    tracing::debug!(
        activity_type = %activity.activity_type,
        path = %activity.path,
        status = activity.status_code,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request observed"
    );

    response
}

fn reads_form(activity_type: ActivityType) -> bool {
    matches!(
        activity_type,
        ActivityType::AddToCart | ActivityType::CurrencyChange
    )
}

/// Resolve route path variables by aligning the matched template with
/// the literal request path, e.g. "/product/{id}" against
/// "/product/SKU123" yields {"id": "SKU123"}.
fn path_variables(template: &str, path: &str) -> HashMap<String, String> {
    template
        .split('/')
        .zip(path.split('/'))
        .filter_map(|(segment, value)| {
            let name = segment.strip_prefix('{')?.strip_suffix('}')?;
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some((name.to_string(), value))
        })
        .collect()
}

/// Buffer the request body and parse it as a urlencoded form.
///
/// The original request is rebuilt around the buffered bytes so the
/// wrapped handler sees exactly what the client sent.
async fn buffer_form(request: Request) -> Result<(Request, HashMap<String, String>), Response> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to buffer request body");
            return Err(
                AppError::BadRequest("failed to read request body".to_string()).into_response(),
            );
        }
    };

    let form = if is_form {
        parse_form(&bytes)
    } else {
        HashMap::new()
    };

    Ok((Request::from_parts(parts, Body::from(bytes)), form))
}

/// Parse an `application/x-www-form-urlencoded` body into a map.
///
/// Undecodable pairs are skipped; the record then carries empty detail
/// fields instead of failing the request.
fn parse_form(bytes: &[u8]) -> HashMap<String, String> {
    let Ok(body) = std::str::from_utf8(bytes) else {
        return HashMap::new();
    };

    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = key.replace('+', " ");
            let value = value.replace('+', " ");
            let key = urlencoding::decode(&key).ok()?.into_owned();
            let value = urlencoding::decode(&value).ok()?.into_owned();
            Some((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_basic() {
        let form = parse_form(b"product_id=SKU123&quantity=2");

        assert_eq!(form.get("product_id").map(String::as_str), Some("SKU123"));
        assert_eq!(form.get("quantity").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_form_decodes_escapes() {
        let form = parse_form(b"name=caf%C3%A9+au+lait&empty=");

        assert_eq!(
            form.get("name").map(String::as_str),
            Some("caf\u{e9} au lait")
        );
        assert_eq!(form.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_form_tolerates_garbage() {
        assert!(parse_form(b"\xff\xfe").is_empty());
        assert!(parse_form(b"").is_empty());

        // A valueless key still parses.
        let form = parse_form(b"flag");
        assert_eq!(form.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_path_variables_align_with_template() {
        let params = path_variables("/product/{id}", "/product/SKU123");
        assert_eq!(params.get("id").map(String::as_str), Some("SKU123"));

        let params = path_variables("/product/{id}", "/product/SKU%20123");
        assert_eq!(params.get("id").map(String::as_str), Some("SKU 123"));

        assert!(path_variables("/cart", "/cart").is_empty());
    }
}
