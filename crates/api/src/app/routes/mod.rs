use axum::{
    routing::{get, post},
    Router,
};

pub mod catalog;
pub mod orders;

/// Router for the public `/api` surface.
pub fn router() -> Router {
    Router::new()
        .route("/products", get(catalog::list_products))
        .route("/products/:category", get(catalog::list_products_by_category))
        .route("/categories", get(catalog::list_categories))
        .route("/sizes", get(catalog::list_sizes))
        .route("/sizes/:category", get(catalog::list_sizes_by_category))
        .route("/order", post(orders::submit_order))
}
