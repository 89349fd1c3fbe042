// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Recorded storefront activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic classification of a storefront request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    PageView,
    AddToCart,
    EmptyCart,
    Checkout,
    CurrencyChange,
    ProductView,
    /// Routed request that matched no classification rule
    Other,
    /// Request that never resolved to a registered route
    Unknown,
}

impl ActivityType {
    /// Name stored in the `activity_type` column and used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::PageView => "page_view",
            ActivityType::AddToCart => "add_to_cart",
            ActivityType::EmptyCart => "empty_cart",
            ActivityType::Checkout => "checkout",
            ActivityType::CurrencyChange => "currency_change",
            ActivityType::ProductView => "product_view",
            ActivityType::Other => "other",
            ActivityType::Unknown => "unknown",
        }
    }

    /// Parse a stored type name. Unrecognized names map to `Unknown`.
    pub fn from_db(name: &str) -> Self {
        match name {
            "page_view" => ActivityType::PageView,
            "add_to_cart" => ActivityType::AddToCart,
            "empty_cart" => ActivityType::EmptyCart,
            "checkout" => ActivityType::Checkout,
            "currency_change" => ActivityType::CurrencyChange,
            "product_view" => ActivityType::ProductView,
            "other" => ActivityType::Other,
            _ => ActivityType::Unknown,
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded user interaction with the storefront.
///
/// Filled in two phases by the tracking middleware: session, request,
/// type, path, method and currency before the wrapped handler runs;
/// status code and details after it returns. Written once, never
/// updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Row ID assigned by the store; 0 while the record is in flight
    pub id: i64,
    /// Browsing session identifier, supplied by the host application
    pub session_id: String,
    /// Per-request identifier, supplied by the host application
    pub request_id: String,
    pub activity_type: ActivityType,
    /// Literal request path (not the route template)
    pub path: String,
    pub method: String,
    /// Response status, 0 until the wrapped handler has completed
    pub status_code: u16,
    pub user_currency: String,
    /// JSON-encoded key/value details, attached only when non-empty
    pub details: Option<String>,
    /// Assigned by the store at insert time
    pub created_at: DateTime<Utc>,
}
