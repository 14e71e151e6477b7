use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use frameshop_catalog::CatalogError;

/// The API's failure envelope: `{"success": false, "error": ...}`.
pub fn failure(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": error.into(),
        })),
    )
        .into_response()
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::CategoryNotFound(_) => {
            failure(StatusCode::NOT_FOUND, "Catégorie non trouvée")
        }
        other => {
            tracing::error!(error = %other, "catalog read failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}
