use serde::{Deserialize, Serialize};

/// One product line picked by the customer.
///
/// This is a partial catalog record echoed back by the order form, plus the
/// requested quantity. Only the fields the quote builder interprets are
/// typed; everything else the form sends travels through `extra` so the
/// order summary echoes exactly what the customer selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedProduct {
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub commercial_name: String,
    #[serde(default)]
    pub frame_size: String,
    #[serde(default)]
    pub workshop_reference: String,
    #[serde(default)]
    pub house_description: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_quantity() -> u32 {
    1
}

impl Default for SelectedProduct {
    fn default() -> Self {
        Self {
            product_code: String::new(),
            commercial_name: String::new(),
            frame_size: String::new(),
            workshop_reference: String::new(),
            house_description: String::new(),
            quantity: 1,
            extra: serde_json::Map::new(),
        }
    }
}

/// Delivery block of the order form.
///
/// Field names mirror the form's camelCase JSON keys. The billing variant of
/// each postal field is flat in the same object, gated by
/// `sameBillingAddress` (HTML-checkbox convention: the literal "on", the
/// default, means billing equals delivery).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub siren: String,
    pub siret: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub notes: String,
    pub same_billing_address: String,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_company_name: String,
    pub billing_siren: String,
    pub billing_siret: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_postal_code: String,
    pub billing_country: String,
}

impl Default for DeliveryAddress {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            company_name: String::new(),
            siren: String::new(),
            siret: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: String::new(),
            notes: String::new(),
            same_billing_address: "on".to_string(),
            billing_first_name: String::new(),
            billing_last_name: String::new(),
            billing_company_name: String::new(),
            billing_siren: String::new(),
            billing_siret: String::new(),
            billing_address: String::new(),
            billing_city: String::new(),
            billing_postal_code: String::new(),
            billing_country: String::new(),
        }
    }
}

impl DeliveryAddress {
    /// Personal name as a single trimmed string ("First Last").
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the billing address is declared identical to delivery.
    pub fn billing_same_as_delivery(&self) -> bool {
        self.same_billing_address == "on"
    }
}

/// A validated order submission: at least one product and a delivery block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub selected_products: Vec<SelectedProduct>,
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub product_notes: String,
}
