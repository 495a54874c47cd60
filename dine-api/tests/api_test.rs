use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use dine_api::{app, AppState};
use dine_core::FixedClock;
use dine_store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap();
    app(AppState::new(Arc::new(MemoryStore::new()), Arc::new(FixedClock(now))))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_table(app: &Router, empty: bool) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/tables",
        Some(json!({ "number_of_guests": 0, "empty": empty })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_product(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Fried chicken", "price": 16000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_order(app: &Router, table_id: i64, product_id: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "order_table_id": table_id,
            "order_line_items": [{ "product_id": product_id, "quantity": 2 }]
        })),
    )
    .await
}

async fn change_status(app: &Router, order_id: i64, status: &str) -> StatusCode {
    let (code, _) = send(
        app,
        Method::PUT,
        &format!("/api/orders/{}/order-status", order_id),
        Some(json!({ "order_status": status })),
    )
    .await;
    code
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_group_and_ungroup_tables() {
    let app = test_app();
    let a = create_table(&app, true).await;
    let b = create_table(&app, true).await;

    let (status, group) = send(
        &app,
        Method::POST,
        "/api/table-groups",
        Some(json!({ "order_table_ids": [a, b] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["created_at"], "2024-05-01T19:00:00Z");

    let group_id = group["id"].as_i64().unwrap();
    let members = group["order_tables"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["id"], a);
    assert_eq!(members[1]["id"], b);
    for member in members {
        assert_eq!(member["table_group_id"], group_id);
        assert_eq!(member["empty"], false);
    }

    let (status, _) = send(&app, Method::DELETE, &format!("/api/table-groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tables) = send(&app, Method::GET, "/api/tables", None).await;
    for table in tables.as_array().unwrap() {
        assert!(table["table_group_id"].is_null());
        assert_eq!(table["empty"], false);
    }

    // second dissolution finds nothing to dissolve
    let (status, body) = send(&app, Method::DELETE, &format!("/api/table-groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_rejected_group_leaves_tables_untouched() {
    let app = test_app();
    let a = create_table(&app, true).await;
    let occupied = create_table(&app, false).await;

    for ids in [json!([a]), json!([a, 999]), json!([a, a]), json!([a, occupied])] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/table-groups",
            Some(json!({ "order_table_ids": ids })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (_, tables) = send(&app, Method::GET, "/api/tables", None).await;
    let tables = tables.as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert!(tables.iter().all(|t| t["table_group_id"].is_null()));
    assert_eq!(tables[0]["empty"], true);
}

#[tokio::test]
async fn test_ungroup_waits_for_orders() {
    let app = test_app();
    let a = create_table(&app, true).await;
    let b = create_table(&app, true).await;
    let product = create_product(&app).await;

    let (_, group) = send(
        &app,
        Method::POST,
        "/api/table-groups",
        Some(json!({ "order_table_ids": [a, b] })),
    )
    .await;
    let group_id = group["id"].as_i64().unwrap();

    let (status, order) = create_order(&app, a, product).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = order["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::DELETE, &format!("/api/table-groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(change_status(&app, order_id, "MEAL").await, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/table-groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, tables) = send(&app, Method::GET, "/api/tables", None).await;
    assert!(tables.as_array().unwrap().iter().all(|t| t["table_group_id"] == group_id));

    assert_eq!(change_status(&app, order_id, "COMPLETION").await, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/table-groups/{}", group_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_order_status_lifecycle() {
    let app = test_app();
    let table = create_table(&app, false).await;
    let product = create_product(&app).await;

    let (status, order) = create_order(&app, table, product).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["order_status"], "COOKING");
    assert_eq!(order["ordered_time"], "2024-05-01T19:00:00Z");
    assert_eq!(order["order_line_items"][0]["quantity"], 2);
    let order_id = order["id"].as_i64().unwrap();

    assert_eq!(change_status(&app, order_id, "MEAL").await, StatusCode::OK);
    assert_eq!(change_status(&app, order_id, "COMPLETION").await, StatusCode::OK);
    assert_eq!(change_status(&app, order_id, "MEAL").await, StatusCode::BAD_REQUEST);

    let (_, orders) = send(&app, Method::GET, "/api/orders", None).await;
    assert_eq!(orders[0]["order_status"], "COMPLETION");

    assert_eq!(change_status(&app, 9999, "MEAL").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_requires_seated_table() {
    let app = test_app();
    let empty = create_table(&app, true).await;
    let product = create_product(&app).await;

    let (status, _) = create_order(&app, empty, product).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create_order(&app, 4242, product).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(json!({
            "order_table_id": empty,
            "order_line_items": [{ "product_id": product, "quantity": 0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_table_seating() {
    let app = test_app();
    let table = create_table(&app, true).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/tables/{}/number-of-guests", table),
        Some(json!({ "number_of_guests": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tables/{}/empty", table),
        Some(json!({ "empty": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["empty"], false);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tables/{}/number-of-guests", table),
        Some(json!({ "number_of_guests": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number_of_guests"], 3);
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Broken", "price": -100 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    create_product(&app).await;
    let (_, products) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(products.as_array().unwrap().len(), 1);

    let (status, group) = send(
        &app,
        Method::POST,
        "/api/menu-groups",
        Some(json!({ "name": "Two-chicken set" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(group["name"], "Two-chicken set");
}

#[tokio::test]
async fn test_menu_endpoints() {
    let app = test_app();
    let product = create_product(&app).await;
    let (_, group) = send(&app, Method::POST, "/api/menu-groups", Some(json!({ "name": "Sets" }))).await;
    let group_id = group["id"].as_i64().unwrap();

    let (status, menu) = send(
        &app,
        Method::POST,
        "/api/menus",
        Some(json!({
            "name": "Two fried chickens",
            "price": 19000,
            "menu_group_id": group_id,
            "menu_products": [{ "product_id": product, "quantity": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(menu["menu_group_id"], group_id);
    assert_eq!(menu["menu_products"][0]["product_id"], product);

    for bad in [
        json!({ "name": "Orphan", "price": 1000, "menu_group_id": 404, "menu_products": [] }),
        json!({
            "name": "Ghost",
            "price": 1000,
            "menu_group_id": group_id,
            "menu_products": [{ "product_id": 999, "quantity": 1 }]
        }),
        json!({
            "name": "Nothing",
            "price": 1000,
            "menu_group_id": group_id,
            "menu_products": [{ "product_id": product, "quantity": 0 }]
        }),
    ] {
        let (status, body) = send(&app, Method::POST, "/api/menus", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (_, menus) = send(&app, Method::GET, "/api/menus", None).await;
    assert_eq!(menus.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_body_gets_error_body() {
    let app = test_app();
    let table = create_table(&app, false).await;
    let product = create_product(&app).await;
    let (_, order) = create_order(&app, table, product).await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{}/order-status", order_id),
        Some(json!({ "order_status": "SERVED" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("SERVED"));

    let (status, body) = send(&app, Method::POST, "/api/tables", Some(json!({ "empty": "yes" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, orders) = send(&app, Method::GET, "/api/orders", None).await;
    assert_eq!(orders[0]["order_status"], "COOKING");
}
