use std::sync::Arc;

use axum::{Extension, Router};

use frameshop_catalog::CatalogService;
use frameshop_orders::OrderSubmitter;

pub mod dto;
pub mod errors;
pub mod routes;

/// Services shared by every handler.
pub struct AppState {
    pub catalog: CatalogService,
    pub submitter: Arc<dyn OrderSubmitter>,
}

/// Build the application router (same tree in production and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(Extension(Arc::new(state)))
}
