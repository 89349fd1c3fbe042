// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity query API routes.
//!
//! All three endpoints are lenient about query parameters: anything
//! malformed falls back to a documented default instead of erroring.

use crate::error::Result;
use crate::middleware::SessionId;
use crate::models::ActivityRecord;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Default limit for the global recent-activities listing.
const DEFAULT_RECENT_LIMIT: u32 = 100;
/// Default limit for per-session listings.
const DEFAULT_SESSION_LIMIT: u32 = 50;
/// Default reporting window for stats queries.
const DEFAULT_STATS_WINDOW_HOURS: i64 = 24;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(recent_activities))
        .route("/api/activities/session", get(session_activities))
        .route("/api/activities/stats", get(activity_stats))
}

// ─── Listings ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListQuery {
    /// Kept as a raw string so a malformed value degrades to the
    /// default instead of rejecting the request.
    limit: Option<String>,
}

impl ListQuery {
    fn limit_or(&self, default: u32) -> u32 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(default)
    }
}

/// List recent activities across all sessions.
async fn recent_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ActivityRecord>>> {
    let limit = params.limit_or(DEFAULT_RECENT_LIMIT);
    let activities = state.store.recent_activities(limit)?;
    Ok(Json(activities))
}

/// List recent activities for the caller's own session.
async fn session_activities(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ActivityRecord>>> {
    let limit = params.limit_or(DEFAULT_SESSION_LIMIT);
    let activities = state.store.activities_by_session(&session.0, limit)?;
    Ok(Json(activities))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StatsQuery {
    /// RFC3339; invalid values fall back to the default window.
    start: Option<String>,
    end: Option<String>,
}

fn parse_rfc3339(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Per-type activity counts over a time window.
///
/// Defaults to the trailing 24 hours ending now; `start` and `end`
/// fall back independently, so a valid `end` with a malformed `start`
/// still uses "24 hours before now" as the lower bound.
async fn activity_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<HashMap<String, i64>>> {
    let now = Utc::now();
    let end = parse_rfc3339(params.end.as_deref()).unwrap_or(now);
    let start = parse_rfc3339(params.start.as_deref())
        .unwrap_or_else(|| now - Duration::hours(DEFAULT_STATS_WINDOW_HOURS));

    let stats = state.store.stats_by_type(start, end)?;
    Ok(Json(stats))
}
