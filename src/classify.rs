// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request classification.
//!
//! Maps (method, matched route template) pairs to activity types and
//! extracts the detail fields each type carries.

use crate::models::ActivityType;
use axum::http::Method;
use std::collections::HashMap;

/// Classify a request by method and matched route template.
///
/// Rules are evaluated top to bottom; the first match wins. A request
/// that resolved to no registered route is `Unknown`; a routed request
/// matching no rule is `Other`.
pub fn classify(method: &Method, route_template: Option<&str>) -> ActivityType {
    let Some(path) = route_template else {
        return ActivityType::Unknown;
    };

    if path == "/" && method == Method::GET {
        ActivityType::PageView
    } else if path == "/cart" && method == Method::POST {
        ActivityType::AddToCart
    } else if path == "/cart/empty" && method == Method::POST {
        ActivityType::EmptyCart
    } else if path == "/cart/checkout" && method == Method::POST {
        ActivityType::Checkout
    } else if path == "/setCurrency" && method == Method::POST {
        ActivityType::CurrencyChange
    } else if path.starts_with("/product/") && method == Method::GET {
        ActivityType::ProductView
    } else {
        ActivityType::Other
    }
}

/// Detail fields for an activity.
///
/// Missing fields are recorded as empty strings so every record of a
/// given type carries the same keys. Types without details return an
/// empty map.
pub fn extract_details(
    activity_type: ActivityType,
    form: &HashMap<String, String>,
    path_params: &HashMap<String, String>,
) -> HashMap<String, String> {
    let field = |source: &HashMap<String, String>, name: &str| {
        source.get(name).cloned().unwrap_or_default()
    };

    let mut details = HashMap::new();
    match activity_type {
        ActivityType::AddToCart => {
            details.insert("product_id".to_string(), field(form, "product_id"));
            details.insert("quantity".to_string(), field(form, "quantity"));
        }
        ActivityType::ProductView => {
            details.insert("product_id".to_string(), field(path_params, "id"));
        }
        ActivityType::CurrencyChange => {
            details.insert("new_currency".to_string(), field(form, "currency_code"));
        }
        _ => {}
    }
    details
}
