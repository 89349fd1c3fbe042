// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Storefront-Activity: per-request activity tracking for a web storefront
//!
//! This crate provides an HTTP middleware that classifies storefront
//! requests into semantic activity types and persists them to a local
//! SQLite store, plus a small JSON API for querying recorded activity.

pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use config::Config;
use db::ActivityStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: ActivityStore,
}
