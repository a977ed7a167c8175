//! End-to-end tests driving the router in memory.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use shopkeep_db::{Database, DbConfig};
use shopkeep_server::{router, AppState};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    router(AppState::new(db), CorsLayer::permissive())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_supplier(app: &Router) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/suppliers",
        Some(json!({
            "name": "ABC Arms Supplier",
            "contact": "03001234567",
            "address": "Karachi, Pakistan",
            "paymentTerms": "30 days"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn create_product(app: &Router, code: &str, name: &str, quantity: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": code,
            "name": name,
            "quantity": quantity,
            "costPrice": 35000,
            "category": "Pistol"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = app().await;
    let supplier = create_supplier(&app).await;

    let (status, product) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A001",
            "name": "PX3 CHINA 30 BORE",
            "quantity": 10,
            "costPrice": 35000,
            "category": "Pistol",
            "supplier": supplier["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["productId"], "A001");
    assert_eq!(product["costPrice"], 35000);
    let id = product["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["supplier"]["name"], "ABC Arms Supplier");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{id}"),
        Some(json!({ "quantity": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 12);
    assert_eq!(body["name"], "PX3 CHINA 30 BORE");

    let (status, body) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 12);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Product not found" }));
}

#[tokio::test]
async fn test_product_uniqueness_messages() {
    let app = app().await;
    create_product(&app, "A001", "PX3 CHINA 30 BORE", 10).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A001",
            "name": "Another",
            "quantity": 1,
            "costPrice": 100,
            "category": "Rifle"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Product with ID \"A001\" already exists. Please use a different Product ID."
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A002",
            "name": "PX3 CHINA 30 BORE",
            "quantity": 1,
            "costPrice": 100,
            "category": "Rifle"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Product with name \"PX3 CHINA 30 BORE\" already exists. Please use a different name."
    );
}

#[tokio::test]
async fn test_invalid_product_input_is_bad_request() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A001",
            "name": "X",
            "quantity": -1,
            "costPrice": 100,
            "category": "Pistol"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Quantity cannot be negative");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A001",
            "name": "X",
            "quantity": 1,
            "costPrice": 100,
            "category": "Shotgun"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Category must be one of: Pistol, Rifle"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A001",
            "name": "X",
            "quantity": 1,
            "costPrice": 49.5,
            "category": "Pistol"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("whole number of currency units"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "productId": "A001",
            "name": "X",
            "quantity": 1,
            "costPrice": 100,
            "category": "Pistol",
            "supplier": "no-such-supplier"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/suppliers")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_supplier_crud() {
    let app = app().await;
    let supplier = create_supplier(&app).await;
    let id = supplier["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/suppliers",
        Some(json!({ "name": "A", "contact": "03001234567" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Supplier name must be at least 2 characters long");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/suppliers/{id}"),
        Some(json!({ "paymentTerms": "45 days" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paymentTerms"], "45 days");

    let (status, body) = send(&app, Method::GET, &format!("/api/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ABC Arms Supplier");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Supplier not found");
}

#[tokio::test]
async fn test_sale_flow() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/sales", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No sales found");

    let product = create_product(&app, "A001", "PX3 CHINA 30 BORE", 10).await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, sale) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "voucherNumber": "V-001",
            "products": [{ "product": product_id, "quantity": 3, "salePrice": 50000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["totalAmount"], 150000);
    assert_eq!(sale["profit"], 45000);
    let sale_id = sale["id"].as_str().unwrap().to_string();

    let (_, body) = send(&app, Method::GET, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(body["quantity"], 7);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "voucherNumber": "V-001",
            "products": [{ "product": product_id, "quantity": 1, "salePrice": 50000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Sale with voucher number \"V-001\" already exists. Please use a different voucher number."
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "voucherNumber": "V-002",
            "products": [{ "product": product_id, "quantity": 8, "salePrice": 50000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Insufficient stock for product \"PX3 CHINA 30 BORE\". Available: 7, Requested: 8"
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "voucherNumber": "V-003",
            "products": [{ "product": "missing", "quantity": 1, "salePrice": 50000 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, list) = send(&app, Method::GET, "/api/sales", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["products"][0]["product"]["name"], "PX3 CHINA 30 BORE");

    let now = Utc::now();
    let (status, report) = send(
        &app,
        Method::GET,
        &format!("/api/sales/monthly/{}/{}", now.year(), now.month()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["numberOfSales"], 1);
    assert_eq!(report["summary"]["totalSales"], 150000);
    assert_eq!(report["summary"]["totalProfit"], 45000);

    let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalProducts"], 1);
    assert_eq!(stats["monthlyOrders"], 1);
    assert_eq!(stats["activeSuppliers"], 0);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sale deleted successfully");

    let (_, body) = send(&app, Method::GET, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(body["quantity"], 10);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sale not found");
}

#[tokio::test]
async fn test_sale_request_validation() {
    let app = app().await;
    let product = create_product(&app, "A001", "PX3 CHINA 30 BORE", 10).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({ "voucherNumber": "V-1", "products": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sales",
        Some(json!({
            "voucherNumber": "V-1",
            "products": [{ "product": product["id"], "quantity": 0, "salePrice": 100 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(body[0]["quantity"], 10);
}

#[tokio::test]
async fn test_monthly_report_empty_and_invalid() {
    let app = app().await;

    let (status, report) = send(&app, Method::GET, "/api/sales/monthly/2024/6", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        report,
        json!({
            "sales": [],
            "summary": { "totalSales": 0, "totalProfit": 0, "numberOfSales": 0 }
        })
    );

    let (status, _) = send(&app, Method::GET, "/api/sales/monthly/2024/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/sales/monthly/2024/june", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
