// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests for the tracking middleware: every request through
//! the router should surface as a classified record in the query API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

async fn recent_activities(app: &axum::Router) -> Vec<serde_json::Value> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/activities?limit=50")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    match body_json(response).await {
        serde_json::Value::Array(items) => items,
        other => panic!("expected array, got {other}"),
    }
}

#[tokio::test]
async fn test_add_to_cart_end_to_end() {
    let (app, _state, _dir) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("product_id=SKU123&quantity=2"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let activities = recent_activities(&app).await;
    let newest = activities.first().expect("one record");

    assert_eq!(newest["activity_type"], "add_to_cart");
    assert_eq!(newest["path"], "/cart");
    assert_eq!(newest["method"], "POST");
    assert_eq!(newest["status_code"], 200);
    assert_eq!(newest["user_currency"], "USD");
    assert!(newest["id"].as_i64().unwrap() > 0);

    let details: serde_json::Value =
        serde_json::from_str(newest["details"].as_str().expect("details attached"))
            .expect("details is JSON");
    assert_eq!(details["product_id"], "SKU123");
    assert_eq!(details["quantity"], "2");
}

#[tokio::test]
async fn test_product_view_captures_path_variable() {
    let (app, _state, _dir) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/product/OLJCESPC7Z")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let activities = recent_activities(&app).await;
    let newest = activities.first().expect("one record");

    assert_eq!(newest["activity_type"], "product_view");
    assert_eq!(newest["path"], "/product/OLJCESPC7Z");

    let details: serde_json::Value =
        serde_json::from_str(newest["details"].as_str().unwrap()).unwrap();
    assert_eq!(details["product_id"], "OLJCESPC7Z");
}

#[tokio::test]
async fn test_currency_change_reads_cookie_and_form() {
    let (app, _state, _dir) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/setCurrency")
                .header(header::COOKIE, "currency=CAD")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("currency_code=EUR"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let activities = recent_activities(&app).await;
    let newest = activities.first().expect("one record");

    // The record carries the currency in effect when the request was
    // made; the new one only appears in the details.
    assert_eq!(newest["activity_type"], "currency_change");
    assert_eq!(newest["user_currency"], "CAD");

    let details: serde_json::Value =
        serde_json::from_str(newest["details"].as_str().unwrap()).unwrap();
    assert_eq!(details["new_currency"], "EUR");
}

#[tokio::test]
async fn test_unrouted_request_recorded_as_unknown() {
    let (app, _state, _dir) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let activities = recent_activities(&app).await;
    let newest = activities.first().expect("one record");

    assert_eq!(newest["activity_type"], "unknown");
    assert_eq!(newest["status_code"], 404);
}

#[tokio::test]
async fn test_routed_but_unclassified_recorded_as_other() {
    let (app, _state, _dir) = common::create_test_app();

    // GET /cart is a registered route but matches no classification rule.
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let activities = recent_activities(&app).await;
    let newest = activities.first().expect("one record");

    assert_eq!(newest["activity_type"], "other");
    assert!(newest["details"].is_null());
}

#[tokio::test]
async fn test_handler_status_code_is_captured() {
    let (app, _state, _dir) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/broken")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let activities = recent_activities(&app).await;
    let newest = activities.first().expect("one record");
    assert_eq!(newest["status_code"], 500);
}

#[tokio::test]
async fn test_new_session_cookie_is_set_and_reused() {
    let (app, _state, _dir) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("shop_session-id="));

    // A request presenting the cookie keeps the same session and gets
    // no new Set-Cookie.
    let session_cookie = set_cookie.split(';').next().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, session_cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let session_id = session_cookie
        .strip_prefix("shop_session-id=")
        .unwrap()
        .to_string();
    let activities = recent_activities(&app).await;
    assert_eq!(activities[0]["session_id"], session_id.as_str());

    // Request identifiers stay unique per request within the session.
    assert_ne!(activities[0]["request_id"], activities[1]["request_id"]);
}

#[tokio::test]
async fn test_query_api_requests_are_recorded_too() {
    let (app, _state, _dir) = common::create_test_app();

    // The listing request itself is observed (as "other") and shows up
    // in subsequent listings.
    recent_activities(&app).await;
    let activities = recent_activities(&app).await;

    let newest = activities.first().expect("one record");
    assert_eq!(newest["activity_type"], "other");
    assert_eq!(newest["path"], "/api/activities");
}
