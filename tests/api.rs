//! End-to-end tests that drive the full router over in-memory `SQLite`.

#![allow(clippy::unwrap_used, clippy::too_many_lines)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use stockroom::{
    api::{AppState, build_router},
    config::{AppConfig, database},
};
use tower::ServiceExt;

struct TestApp {
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let config = AppConfig::from_lookup(|key| {
            let value = match key {
                "PORT" => "3001",
                "DATABASE_URL" => "sqlite::memory:",
                "JWT_SECRET" => "integration-test-secret-of-enough-length",
                "FRONTEND_URL" => "http://localhost:5173",
                "BCRYPT_COST" => "4",
                _ => return None,
            };
            Some(value.to_string())
        })
        .unwrap();
        let db = database::create_connection(&config.database_url).await.unwrap();
        database::create_tables(&db).await.unwrap();
        let router = build_router(AppState::new(db, &config), &config).unwrap();
        Self { router }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"email": email, "password": "secret1", "name": "Tester"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn create_item(&self, token: &str, sku: &str, quantity: i32, reorder_level: i32) -> i64 {
        let (status, body) = self
            .post(
                "/api/inventory",
                token,
                json!({
                    "productName": format!("Item {sku}"),
                    "sku": sku,
                    "quantity": quantity,
                    "unitPrice": 10.0,
                    "reorderLevel": reorder_level,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());

    let (status, body) = app.send(Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn test_auth_flow() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;

    let (status, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "ALICE@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists with this email");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/inventory", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/inventory", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_errors_are_field_level() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;

    let (status, body) = app
        .post(
            "/api/inventory",
            &token,
            json!({"productName": "Widget", "sku": "  ", "quantity": -1, "unitPrice": 1.0}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"sku"));
    assert!(fields.contains(&"quantity"));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/inventory",
            Some(&token),
            Some(json!("not an object")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    let widget = app.create_item(&token, "WID-001", 0, 0).await;

    let (status, body) = app
        .post(
            "/api/purchase-orders",
            &token,
            json!({
                "poNumber": "PO-1",
                "supplierName": "Acme",
                "expectedDelivery": "2030-01-01",
                "items": [{"inventoryId": widget, "quantity": 1000, "costPerUnit": 1e28}],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["errors"][0]["field"], "items[0].costPerUnit");

    let (status, body) = app.get("/api/purchase-orders", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_tenant_isolation() {
    let app = TestApp::new().await;
    let alice = app.register("alice@example.com").await;
    let bob = app.register("bob@example.com").await;

    let item = app.create_item(&alice, "WID-001", 5, 0).await;
    // Same SKU is fine for a different owner
    app.create_item(&bob, "WID-001", 7, 0).await;

    let (_, body) = app.get("/api/inventory", &bob).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["quantity"], 7);

    let (status, _) = app.get(&format!("/api/inventory/{item}"), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/inventory/{item}"),
            Some(&bob),
            Some(json!({"quantity": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/inventory/{item}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&format!("/api/inventory/{item}"), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 5);
}

#[tokio::test]
async fn test_duplicate_sku_rejected() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    app.create_item(&token, "WID-001", 5, 0).await;

    let (status, body) = app
        .post(
            "/api/inventory",
            &token,
            json!({"productName": "Other", "sku": "WID-001", "unitPrice": 1.0}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "SKU already exists: WID-001");
}

#[tokio::test]
async fn test_low_stock_boundary() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    app.create_item(&token, "AT", 5, 5).await;
    app.create_item(&token, "ABOVE", 6, 5).await;
    app.create_item(&token, "BELOW", 4, 5).await;

    let (status, body) = app.get("/api/inventory/alerts/low-stock", &token).await;
    assert_eq!(status, StatusCode::OK);
    let skus: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["sku"].as_str().unwrap())
        .collect();
    assert_eq!(skus, vec!["BELOW", "AT"]);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_sales_order_total_and_stock() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    let a = app.create_item(&token, "A", 10, 0).await;
    let b = app.create_item(&token, "B", 10, 0).await;

    let (status, body) = app
        .post(
            "/api/sales-orders",
            &token,
            json!({
                "orderNumber": "SO-1",
                "customerName": "Walk-in",
                "totalAmount": 999.0,
                "items": [
                    {"inventoryId": a, "quantity": 2, "unitPrice": 10.0},
                    {"inventoryId": b, "quantity": 1, "unitPrice": 5.5},
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["totalAmount"], json!(25.5));
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["items"][0]["inventory"]["sku"], "A");

    let (_, body) = app.get(&format!("/api/inventory/{a}"), &token).await;
    assert_eq!(body["data"]["quantity"], 8);

    let (status, body) = app
        .post(
            "/api/sales-orders",
            &token,
            json!({
                "orderNumber": "SO-1",
                "customerName": "Walk-in",
                "totalAmount": 1.0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order number already exists: SO-1");

    let (status, body) = app
        .post(
            "/api/sales-orders",
            &token,
            json!({
                "orderNumber": "SO-2",
                "customerName": "Walk-in",
                "items": [{"inventoryId": a, "quantity": 50}],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Insufficient stock"));
}

#[tokio::test]
async fn test_status_filter() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;

    for (number, status) in [("SO-1", "PENDING"), ("SO-2", "SHIPPED"), ("SO-3", "PENDING")] {
        let (code, body) = app
            .post(
                "/api/sales-orders",
                &token,
                json!({
                    "orderNumber": number,
                    "customerName": "Walk-in",
                    "totalAmount": 10.0,
                    "status": status,
                }),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
    }

    let (status, body) = app.get("/api/sales-orders/status/PENDING", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["orderNumber"], "SO-3");

    let (status, body) = app.get("/api/sales-orders/status/BOGUS", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status: BOGUS");

    let (status, _) = app.get("/api/purchase-orders/status/BOGUS", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_date_range_query() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    for (number, date) in [("SO-1", "2024-01-10"), ("SO-2", "2024-02-10")] {
        app.post(
            "/api/sales-orders",
            &token,
            json!({
                "orderNumber": number,
                "customerName": "Walk-in",
                "totalAmount": 10.0,
                "orderDate": date,
            }),
        )
        .await;
    }

    let (status, body) = app
        .get("/api/sales-orders/date-range?start=2024-01-01&end=2024-01-31", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["orderNumber"], "SO-1");

    let (status, _) = app
        .get("/api/sales-orders/date-range?start=2024-02-01&end=2024-01-01", &token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/sales-orders/date-range?start=yesterday&end=2024-01-01", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_supplier_delete_versus_deactivate() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;

    let (_, body) = app.post("/api/suppliers", &token, json!({"name": "Acme"})).await;
    let referenced = body["data"]["id"].as_i64().unwrap();
    let (_, body) = app.post("/api/suppliers", &token, json!({"name": "Loose"})).await;
    let unreferenced = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .post(
            "/api/inventory",
            &token,
            json!({"productName": "Widget", "sku": "W", "unitPrice": 1.0, "supplierId": referenced}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/suppliers/{referenced}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = app.get(&format!("/api/suppliers/{referenced}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);
    assert_eq!(body["data"]["inventoryItems"][0]["sku"], "W");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/suppliers/{unreferenced}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/suppliers/{unreferenced}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.post("/api/suppliers", &token, json!({"name": "Acme"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_toggle_status_twice_restores() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    let (_, body) = app.post("/api/customers", &token, json!({"name": "Initech"})).await;
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/customers/{id}/toggle-status");

    let (status, body) = app.send(Method::PATCH, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);
    assert_eq!(body["message"], "Customer deactivated successfully");

    let (_, body) = app.send(Method::PATCH, &uri, Some(&token), None).await;
    assert_eq!(body["data"]["isActive"], true);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/customers/{id}/status"),
            Some(&token),
            Some(json!({"isActive": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (_, body) = app.get("/api/customers/active", &token).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_customer_search_is_case_insensitive() {
    let app = TestApp::new().await;
    let token = app.register("alice@example.com").await;
    app.post("/api/customers", &token, json!({"name": "Initech", "email": "ops@initech.example"}))
        .await;
    app.post("/api/customers", &token, json!({"name": "Globex"})).await;

    let (status, body) = app.get("/api/customers/search/INIT", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Initech");
}

#[tokio::test]
async fn test_business_day_scenario() {
    let app = TestApp::new().await;
    let token = app.register("owner@example.com").await;

    let (_, body) = app
        .post("/api/suppliers", &token, json!({"name": "Acme Parts", "email": "sales@acme.example"}))
        .await;
    let supplier = body["data"]["id"].as_i64().unwrap();
    let (_, body) = app.post("/api/customers", &token, json!({"name": "Initech"})).await;
    let customer = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app
        .post(
            "/api/inventory",
            &token,
            json!({
                "productName": "Widget",
                "sku": "WID-001",
                "quantity": 12,
                "unitPrice": 2.25,
                "reorderLevel": 10,
                "supplierId": supplier,
            }),
        )
        .await;
    let widget = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["category"], "Other");

    let (status, body) = app
        .post(
            "/api/sales-orders",
            &token,
            json!({
                "orderNumber": "SO-100",
                "customerId": customer,
                "orderDate": "2024-03-01",
                "items": [{"inventoryId": widget, "quantity": 4}],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["customerName"], "Initech");
    assert_eq!(body["data"]["totalAmount"], json!(9.0));

    let (_, body) = app.get("/api/inventory/alerts/low-stock", &token).await;
    assert_eq!(body["data"][0]["quantity"], 8);

    let (status, body) = app
        .post(
            "/api/purchase-orders",
            &token,
            json!({
                "poNumber": "PO-100",
                "supplierId": supplier,
                "expectedDelivery": "2000-01-01",
                "items": [{"inventoryId": widget, "quantity": 20, "costPerUnit": 1.5}],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["supplierName"], "Acme Parts");
    assert_eq!(body["data"]["totalAmount"], json!(30.0));

    let (_, body) = app.get("/api/purchase-orders/alerts/overdue", &token).await;
    assert_eq!(body["total"], 1);

    let (status, body) = app.get("/api/reports/dashboard", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["inventoryItems"], 1);
    assert_eq!(body["data"]["lowStockItems"], 1);
    assert_eq!(body["data"]["revenue"], json!(9.0));
    assert_eq!(body["data"]["spend"], json!(30.0));
    assert_eq!(body["data"]["overduePurchaseOrders"], 1);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/inventory/{widget}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("referenced"));
}
