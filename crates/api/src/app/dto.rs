use serde::Deserialize;

use frameshop_core::{DeliveryAddress, OrderRequest, SelectedProduct};

// -------------------------
// Request DTOs
// -------------------------

/// Raw `POST /api/order` body, before validation.
#[derive(Debug, Deserialize)]
pub struct OrderBody {
    #[serde(default)]
    pub selected_products: Vec<SelectedProduct>,
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub product_notes: String,
}

impl OrderBody {
    /// Promote the body to a validated order, or report what is missing.
    pub fn into_order(self) -> Result<OrderRequest, &'static str> {
        let Some(delivery_address) = self.delivery_address else {
            return Err("Données manquantes");
        };
        if self.selected_products.is_empty() {
            return Err("Données manquantes");
        }
        Ok(OrderRequest {
            selected_products: self.selected_products,
            delivery_address,
            product_notes: self.product_notes,
        })
    }
}
