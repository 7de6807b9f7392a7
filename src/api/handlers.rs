use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ProductDetail, ProductSummary},
    services::validate_top_n,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedItemsQuery {
    pub limit: Option<i64>,
}

fn not_found(item_id: &str) -> AppError {
    AppError::NotFound(format!("Product with ID '{}' not found.", item_id))
}

/// Root endpoint
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": format!("Welcome to {}!", state.config.app_name),
    }))
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Lists product summaries, optionally filtered by category name and brand
pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> AppResult<Json<Vec<ProductSummary>>> {
    let Query(query) = query?;
    let items = state
        .catalog
        .find_all_products(query.category.as_deref(), query.brand.as_deref());

    tracing::debug!(
        category = ?query.category,
        brand = ?query.brand,
        count = items.len(),
        "Listed items"
    );

    Ok(Json(items))
}

/// Full product details, including related products
pub async fn get_item_details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(item_id): Path<String>,
) -> AppResult<Json<ProductDetail>> {
    let detail = state
        .catalog
        .find_product_details(&item_id, state.config.related_items_limit)?
        .ok_or_else(|| not_found(&item_id))?;

    tracing::info!(
        request_id = %request_id,
        item_id = %item_id,
        related = detail.related_products.len(),
        "Served item details"
    );

    Ok(Json(detail))
}

/// Products similar to `item_id` within its category. An empty list means
/// there is nothing to recommend.
pub async fn get_related_items(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(item_id): Path<String>,
    query: Result<Query<RelatedItemsQuery>, QueryRejection>,
) -> AppResult<Json<Vec<ProductSummary>>> {
    let Query(query) = query?;
    let top_n = match query.limit {
        Some(limit) => validate_top_n(limit)?,
        None => state.config.related_items_limit,
    };

    let related = state
        .catalog
        .related_products(&item_id, top_n)
        .ok_or_else(|| not_found(&item_id))?;

    tracing::info!(
        request_id = %request_id,
        item_id = %item_id,
        top_n,
        returned = related.len(),
        "Served related items"
    );

    Ok(Json(related))
}
