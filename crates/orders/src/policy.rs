//! Fallback policies of the workflow, one named pure function per step.
//!
//! Each function maps (previous state, CRM reply) to the identifier carried
//! into the next step, so the exact degradation behavior is testable without
//! a transport.

use serde_json::Value;

use frameshop_core::SelectedProduct;
use frameshop_sellsy::response::{extract_id, success_payload};

/// Address id announced by a `Client.addAddress` envelope, if the call
/// succeeded.
pub fn created_address_id(envelope: &Value) -> Option<String> {
    success_payload(envelope).and_then(|payload| extract_id(payload, &["address_id", "id"]))
}

/// Delivery-address id carried into the quote.
///
/// No street address on the order means no delivery address at all (the
/// default is NOT substituted here); a failed creation falls back to the
/// client's pre-existing default address.
pub fn choose_delivery_address(
    street_given: bool,
    created: Option<String>,
    default_id: Option<&str>,
) -> Option<String> {
    if !street_given {
        return None;
    }
    created.or_else(|| default_id.map(str::to_string))
}

/// Billing-address id carried into the quote.
///
/// Billing declared identical to delivery reuses the delivery id (or the
/// default when none); a distinct billing address that failed to create
/// falls back to the default.
pub fn choose_billing_address(
    same_as_delivery: bool,
    created: Option<String>,
    delivery_id: Option<&str>,
    default_id: Option<&str>,
) -> Option<String> {
    if same_as_delivery {
        delivery_id.or(default_id).map(str::to_string)
    } else {
        created.or_else(|| default_id.map(str::to_string))
    }
}

/// Whether a freshly created client also gets a linked contact person:
/// only when a company name and a personal name are both present.
pub fn wants_contact(company_name: &str, first_name: &str, last_name: &str) -> bool {
    !company_name.is_empty() && (!first_name.is_empty() || !last_name.is_empty())
}

/// Quote subject: "Devis - " plus up to three commercial names.
pub fn quote_subject(products: &[SelectedProduct]) -> String {
    let names: Vec<&str> = products
        .iter()
        .take(3)
        .map(|p| p.commercial_name.as_str())
        .collect();
    format!("Devis - {}", names.join(", "))
}
