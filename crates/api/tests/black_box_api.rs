use std::path::PathBuf;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use stockroom_api::app::services::{self, AppServices};
use stockroom_infra::AppConfig;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(services::in_memory_services()).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = stockroom_api::app::build_app(Arc::new(services), frontend_dir());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, client: &reqwest::Client, path: &str, body: Value) -> (StatusCode, Value) {
        let res = client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, client: &reqwest::Client, path: &str) -> (StatusCode, Value) {
        let res = client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn delete(&self, client: &reqwest::Client, path: &str) -> (StatusCode, Value) {
        let res = client.delete(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn frontend_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../frontend"))
}

async fn seed_laptop_and_warehouse(srv: &TestServer, client: &reqwest::Client) {
    let (status, _) = srv
        .post(client, "/api/products", json!({ "product_id": "PROD001", "name": "Laptop" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = srv
        .post(client, "/api/locations", json!({ "location_id": "WH001", "name": "Main Warehouse" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_create_list_and_duplicate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, created) = srv
        .post(
            &client,
            "/api/products",
            json!({ "product_id": "PROD001", "name": "Laptop", "description": "High-performance laptop" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["product_id"], "PROD001");
    assert_eq!(created["name"], "Laptop");
    assert!(created["created_at"].as_str().is_some());

    let (status, body) = srv
        .post(&client, "/api/products", json!({ "product_id": "PROD001", "name": "Again" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product already exists");

    let (status, body) = srv
        .post(&client, "/api/products", json!({ "product_id": "PROD002" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product ID and name are required");

    let (status, list) = srv.get(&client, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn product_search_matches_any_field_case_insensitively() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "product_id": "PROD001", "name": "Laptop", "description": "High-performance laptop" }),
        json!({ "product_id": "PROD002", "name": "Mouse", "description": "Wireless mouse" }),
    ] {
        let (status, _) = srv.post(&client, "/api/products", body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, hits) = srv.get(&client, "/api/products?search=WIRELESS").await;
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["product_id"], "PROD002");

    let (_, hits) = srv.get(&client, "/api/products?search=prod00").await;
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let (_, hits) = srv.get(&client, "/api/products?search=").await;
    assert_eq!(hits.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_unknown_ids_returns_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = srv.delete(&client, "/api/products/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");

    let (status, _) = srv.delete(&client, "/api/locations/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = srv.delete(&client, "/api/movements/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = srv.delete(&client, "/api/movements/not-a-number").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_in_movement_is_classified_and_listed_first() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (status, earlier) = srv
        .post(
            &client,
            "/api/movements",
            json!({ "product_id": "PROD001", "to_location": "WH001", "qty": 1, "timestamp": "2020-01-01T00:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, movement) = srv
        .post(
            &client,
            "/api/movements",
            json!({ "product_id": "PROD001", "to_location": "WH001", "qty": 20 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(movement["movement_type"], "Stock In");
    assert_eq!(movement["qty"], 20);
    assert!(movement["from_location"].is_null());
    assert!(movement["movement_id"].as_i64().unwrap() > earlier["movement_id"].as_i64().unwrap());

    let (status, list) = srv.get(&client, "/api/movements").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["movement_id"], movement["movement_id"]);
    assert_eq!(list[1]["movement_id"], earlier["movement_id"]);
}

#[tokio::test]
async fn movement_validation_failures_are_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let cases = [
        (json!({ "product_id": "PROD001", "to_location": "WH001" }), "Product ID and quantity required"),
        (json!({ "product_id": "PROD001", "qty": 0 }), "Product ID and quantity required"),
        (json!({ "qty": 5 }), "Product ID and quantity required"),
        (json!({ "product_id": "PROD001", "qty": -4 }), "Quantity must be positive"),
        (json!({ "product_id": "GHOST", "qty": 4 }), "Product not found"),
    ];

    for (body, message) in cases {
        let (status, err) = srv.post(&client, "/api/movements", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], message);
    }

    let (_, list) = srv.get(&client, "/api/movements").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_locations_are_accepted_on_movements() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (status, movement) = srv
        .post(
            &client,
            "/api/movements",
            json!({ "product_id": "PROD001", "from_location": "WH001", "to_location": "NOWHERE", "qty": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(movement["movement_type"], "Transfer");
}

#[tokio::test]
async fn product_delete_cascades_but_location_delete_does_not() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (status, _) = srv
        .post(&client, "/api/products", json!({ "product_id": "PROD002", "name": "Mouse" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for body in [
        json!({ "product_id": "PROD001", "to_location": "WH001", "qty": 5 }),
        json!({ "product_id": "PROD002", "to_location": "WH001", "qty": 7 }),
    ] {
        let (status, _) = srv.post(&client, "/api/movements", body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = srv.delete(&client, "/api/locations/WH001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Location deleted");
    let (_, list) = srv.get(&client, "/api/movements").await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (status, body) = srv.delete(&client, "/api/products/PROD001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted");

    let (_, list) = srv.get(&client, "/api/movements").await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["product_id"], "PROD002");
}

#[tokio::test]
async fn movement_delete_reports_success() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (_, movement) = srv
        .post(&client, "/api/movements", json!({ "product_id": "PROD001", "to_location": "WH001", "qty": 3 }))
        .await;
    let id = movement["movement_id"].as_i64().unwrap();

    let (status, body) = srv.delete(&client, &format!("/api/movements/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Movement deleted");

    let (status, _) = srv.delete(&client, &format!("/api/movements/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn movement_qty_may_be_sent_as_a_string() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (status, movement) = srv
        .post(
            &client,
            "/api/movements",
            json!({ "product_id": "PROD001", "to_location": "WH001", "qty": "5" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(movement["qty"], 5);
    assert_eq!(movement["movement_type"], "Stock In");
}

#[tokio::test]
async fn malformed_bodies_get_the_required_fields_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/locations"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Location ID and name are required");
}

#[tokio::test]
async fn stock_report_summarizes_balances() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (status, _) = srv
        .post(&client, "/api/locations", json!({ "location_id": "STORE01", "name": "Retail Store" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    for body in [
        json!({ "product_id": "PROD001", "to_location": "WH001", "qty": 20 }),
        json!({ "product_id": "PROD001", "from_location": "WH001", "to_location": "STORE01", "qty": 2 }),
    ] {
        let (status, _) = srv.post(&client, "/api/movements", body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, report) = srv.get(&client, "/api/reports/stock").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_items"], 20);
    assert_eq!(report["low_stock_count"], 1);
    assert_eq!(report["active_locations"], 2);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows[0]["location_name"], "Main Warehouse");
    assert_eq!(rows[0]["qty"], 18);
    assert_eq!(rows[0]["status"], "In Stock");
    assert_eq!(rows[1]["location_name"], "Retail Store");
    assert_eq!(rows[1]["status"], "Low Stock");
}

#[tokio::test]
async fn front_end_is_served_from_static_dir() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"].to_str().unwrap().starts_with("text/html"));

    let res = reqwest::get(srv.url("/static/app.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::get(srv.url("/static/missing.css")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sqlite_backed_services_behave_the_same() {
    let config = AppConfig {
        database_url: Some("sqlite::memory:".to_string()),
        seed_sample_data: false,
        ..AppConfig::default()
    };
    let services = services::build_services(&config).await.unwrap();
    let srv = TestServer::spawn_with(services).await;
    let client = reqwest::Client::new();
    seed_laptop_and_warehouse(&srv, &client).await;

    let (status, movement) = srv
        .post(&client, "/api/movements", json!({ "product_id": "PROD001", "to_location": "WH001", "qty": 20 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(movement["movement_type"], "Stock In");

    let (status, body) = srv
        .post(&client, "/api/locations", json!({ "location_id": "WH001", "name": "Dup" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Location already exists");

    let (status, _) = srv.delete(&client, "/api/products/PROD001").await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = srv.get(&client, "/api/movements").await;
    assert!(list.as_array().unwrap().is_empty());
}
