use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::app::{dto, errors, AppState};

/// Accept an order, run the CRM workflow, and answer with the order summary.
///
/// A CRM failure is reported inside the envelope, not as an HTTP failure:
/// the customer's request itself was accepted. Only missing required fields
/// are rejected up front, before any CRM call.
pub async fn submit_order(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::OrderBody>,
) -> axum::response::Response {
    let order = match body.into_order() {
        Ok(order) => order,
        Err(message) => return errors::failure(StatusCode::BAD_REQUEST, message),
    };

    let order_id = format!("DEVIS-{}", Utc::now().format("%Y%m%d%H%M%S"));
    info!(order_id = %order_id, products = order.selected_products.len(), "order received");

    let outcome = state.submitter.submit(&order).await;

    let crm_success = outcome.success;
    let client_id = outcome.client_id.clone();
    let estimate_id = outcome.estimate_id.clone();
    let crm_error = outcome.error.clone();

    let order_summary = json!({
        "order_id": order_id,
        "products": order.selected_products,
        "delivery_address": order.delivery_address,
        "timestamp": Utc::now().to_rfc3339(),
        "sellsy_integration": outcome,
    });

    let response = if crm_success {
        json!({
            "success": true,
            "message": "Demande de devis soumise avec succès et intégrée dans Sellsy",
            "order": order_summary,
            "sellsy_client_id": client_id,
            "sellsy_opportunity_id": estimate_id,
        })
    } else {
        json!({
            "success": true,
            "message": "Demande de devis soumise avec succès (erreur d'intégration Sellsy)",
            "order": order_summary,
            "sellsy_error": crm_error,
        })
    };
    Json(response).into_response()
}
