use std::path::PathBuf;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::Value;

use catalog_api::{
    api::{create_router, AppState},
    config::Config,
    store::CatalogStore,
};

fn create_test_server() -> TestServer {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = Config {
        data_dir: root.join("data"),
        images_dir: root.join("public/images"),
        ..Config::default()
    };
    let catalog = CatalogStore::load(&config.data_dir).unwrap();
    let app = create_router(AppState::new(catalog, config));
    TestServer::new(app).unwrap()
}

fn ids(items: &[Value]) -> Vec<&str> {
    items.iter().map(|p| p["id"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_root() {
    let server = create_test_server();
    let body: Value = server.get("/").await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Welcome to Catalog API!");
}

#[tokio::test]
async fn test_get_item_details() {
    let server = create_test_server();
    let response = server.get("/api/v1/items/SMA001").await;
    response.assert_status_ok();

    let data: Value = response.json();
    assert_eq!(data["id"], "SMA001");
    assert_eq!(data["seller"]["name"], "Tienda Oficial Apple");
    assert_eq!(data["category"]["name"], "Smartphones");
    assert_eq!(data["average_rating"], 4.5);
    assert_eq!(data["accepted_payment_methods"].as_array().unwrap().len(), 3);

    let related = data["related_products"].as_array().unwrap();
    assert!(!related.is_empty());
    assert!(related.len() <= 5);
    // The other iPhone is the closest match
    assert_eq!(related[0]["id"], "SMA004");
    assert!(ids(related).iter().all(|id| *id != "SMA001"));

    for id in ids(related) {
        let other: Value = server.get(&format!("/api/v1/items/{id}")).await.json();
        assert_eq!(other["category"]["id"], data["category"]["id"]);
    }
}

#[tokio::test]
async fn test_get_item_details_not_found() {
    let server = create_test_server();
    let response = server.get("/api/v1/items/ID_DOES_NOT_EXIST").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Product with ID 'ID_DOES_NOT_EXIST' not found.");
}

#[tokio::test]
async fn test_missing_description_is_empty_string() {
    let server = create_test_server();
    let data: Value = server.get("/api/v1/items/PAP003").await.json();
    assert_eq!(data["description"], "");
}

#[tokio::test]
async fn test_single_product_category_has_empty_related() {
    let server = create_test_server();

    let data: Value = server.get("/api/v1/items/ACC001").await.json();
    assert_eq!(data["related_products"].as_array().unwrap().len(), 0);

    let response = server.get("/api/v1/items/ACC001/related").await;
    response.assert_status_ok();
    let related: Vec<Value> = response.json();
    assert!(related.is_empty());
}

#[tokio::test]
async fn test_related_items_with_limit() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/items/SMA002/related")
        .add_query_param("limit", 2)
        .await;
    response.assert_status_ok();

    let related: Vec<Value> = response.json();
    assert_eq!(related.len(), 2);
    assert!(ids(&related).iter().all(|id| id.starts_with("SMA") && *id != "SMA002"));

    let longer: Vec<Value> = server
        .get("/api/v1/items/SMA002/related")
        .add_query_param("limit", 4)
        .await
        .json();
    assert_eq!(&ids(&longer)[..2], ids(&related).as_slice());
}

#[tokio::test]
async fn test_related_items_negative_limit() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/items/SMA001/related")
        .add_query_param("limit", -1)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_related_items_non_numeric_limit_is_json_error() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/items/SMA001/related")
        .add_query_param("limit", "abc")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input:"));
}

#[tokio::test]
async fn test_related_items_repeated_calls_agree() {
    let server = create_test_server();
    let first: Vec<Value> = server.get("/api/v1/items/SMA002/related").await.json();
    for _ in 0..20 {
        let again: Vec<Value> = server.get("/api/v1/items/SMA002/related").await.json();
        assert_eq!(ids(&again), ids(&first));
    }
}

#[tokio::test]
async fn test_related_items_not_found() {
    let server = create_test_server();
    let response = server.get("/api/v1/items/NOPE/related").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_items_no_filter() {
    let server = create_test_server();
    let response = server.get("/api/v1/items").await;
    response.assert_status_ok();
    let data: Vec<Value> = response.json();
    assert_eq!(data.len(), 12);
}

#[tokio::test]
async fn test_list_items_filter_by_category() {
    let server = create_test_server();
    let data: Vec<Value> = server
        .get("/api/v1/items")
        .add_query_param("category", "Smartphones")
        .await
        .json();
    assert_eq!(data.len(), 5);
    assert!(ids(&data).iter().all(|id| id.starts_with("SMA")));
}

#[tokio::test]
async fn test_list_items_filter_by_category_and_brand() {
    let server = create_test_server();
    let data: Vec<Value> = server
        .get("/api/v1/items")
        .add_query_param("category", "Muebles")
        .add_query_param("brand", "Maderkit")
        .await
        .json();
    assert_eq!(ids(&data), vec!["MUE001", "MUE003"]);
}

#[tokio::test]
async fn test_list_items_no_results() {
    let server = create_test_server();
    let response = server
        .get("/api/v1/items")
        .add_query_param("brand", "NonExistentBrand")
        .await;
    response.assert_status_ok();
    let data: Vec<Value> = response.json();
    assert!(data.is_empty());
}

#[tokio::test]
async fn test_summary_without_images_has_empty_image() {
    let server = create_test_server();
    let data: Vec<Value> = server
        .get("/api/v1/items")
        .add_query_param("brand", "Samsung")
        .await
        .json();
    let a54 = data.iter().find(|p| p["id"] == "SMA005").unwrap();
    assert_eq!(a54["image"], "");
    assert_eq!(a54["average_rating"], 0.0);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = "7f1c7c1e-2f44-4a8e-9d3a-0c2f4b9e1a11";
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    let echoed = response.headers().get("x-request-id").unwrap();
    assert_eq!(echoed.to_str().unwrap(), id);
}

#[tokio::test]
async fn test_serves_images() {
    let server = create_test_server();
    let response = server.get("/images/SMA001-1.svg").await;
    response.assert_status_ok();
}
