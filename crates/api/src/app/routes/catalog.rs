use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::app::{errors, AppState};

pub async fn list_products(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Response {
    match state.catalog.all_products() {
        Ok(products) => Json(json!({ "success": true, "products": products })).into_response(),
        Err(err) => errors::catalog_error_to_response(err),
    }
}

pub async fn list_products_by_category(
    Extension(state): Extension<Arc<AppState>>,
    Path(category): Path<String>,
) -> axum::response::Response {
    match state.catalog.products_for_category(&category) {
        Ok(products) => Json(json!({ "success": true, "products": products })).into_response(),
        Err(err) => errors::catalog_error_to_response(err),
    }
}

pub async fn list_categories(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Response {
    match state.catalog.categories() {
        Ok(categories) => {
            Json(json!({ "success": true, "categories": categories })).into_response()
        }
        Err(err) => errors::catalog_error_to_response(err),
    }
}

pub async fn list_sizes(Extension(state): Extension<Arc<AppState>>) -> axum::response::Response {
    match state.catalog.sizes() {
        Ok(sizes) => Json(json!({ "success": true, "sizes": sizes })).into_response(),
        Err(err) => errors::catalog_error_to_response(err),
    }
}

pub async fn list_sizes_by_category(
    Extension(state): Extension<Arc<AppState>>,
    Path(category): Path<String>,
) -> axum::response::Response {
    match state.catalog.sizes_for_category(&category) {
        Ok(sizes) => Json(json!({ "success": true, "sizes": sizes })).into_response(),
        Err(err) => errors::catalog_error_to_response(err),
    }
}
