//! Method wrappers over the transport.
//!
//! Each operation is a thin request/response shape around one v1 method
//! call. Wrappers return the raw envelope (or a decoded option for the
//! search-style calls) and leave fallback decisions to the order workflow.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use frameshop_core::{DeliveryAddress, SelectedProduct};

use crate::response::{self, default_address_hint, id_field};
use crate::transport::{HttpTransport, SellsyTransport};
use crate::{SellsyConfig, SellsyError};

/// Trailing product-code marker for the "back with easel" variant.
pub const VARIANT_SUFFIX: &str = "DC";
/// Catalog-internal numeric code the variant marker maps to.
pub const VARIANT_CATALOG_CODE: &str = "123";

/// Nominal price of a quote line whose code was not found in the catalog.
const PLACEHOLDER_PRICE: &str = "0.01";
/// VAT rate applied to every quote line.
const LINE_TAX_RATE: &str = "20.00";

/// Client payload assembled from the order's delivery block.
#[derive(Debug, Clone, Default)]
pub struct ClientData {
    pub first_name: String,
    pub last_name: String,
    pub name: String,
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
}

impl ClientData {
    pub fn from_delivery(delivery: &DeliveryAddress) -> Self {
        Self {
            first_name: delivery.first_name.clone(),
            last_name: delivery.last_name.clone(),
            name: delivery.full_name(),
            company_name: delivery.company_name.clone(),
            siren: delivery.siren.clone(),
            siret: delivery.siret.clone(),
            email: delivery.email.clone(),
            phone: delivery.phone.clone(),
            address: delivery.address.clone(),
            city: delivery.city.clone(),
            postal_code: delivery.postal_code.clone(),
            country: delivery.country.clone(),
            notes: delivery.notes.clone(),
        }
    }
}

/// Postal address payload for `Client.addAddress`.
#[derive(Debug, Clone, Default)]
pub struct AddressData {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
}

impl AddressData {
    /// Delivery-address payload of the order form.
    pub fn delivery_of(delivery: &DeliveryAddress) -> Self {
        Self {
            address: delivery.address.clone(),
            city: delivery.city.clone(),
            postal_code: delivery.postal_code.clone(),
            country: delivery.country.clone(),
            first_name: delivery.first_name.clone(),
            last_name: delivery.last_name.clone(),
            company_name: delivery.company_name.clone(),
        }
    }

    /// Distinct billing-address payload of the order form.
    pub fn billing_of(delivery: &DeliveryAddress) -> Self {
        Self {
            address: delivery.billing_address.clone(),
            city: delivery.billing_city.clone(),
            postal_code: delivery.billing_postal_code.clone(),
            country: delivery.billing_country.clone(),
            first_name: delivery.billing_first_name.clone(),
            last_name: delivery.billing_last_name.clone(),
            company_name: delivery.billing_company_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Billing,
    Delivery,
}

impl AddressKind {
    fn label(self) -> &'static str {
        match self {
            AddressKind::Billing => "Adresse de facturation",
            AddressKind::Delivery => "Adresse de livraison",
        }
    }
}

/// Mutable client fields for `Client.update`; unset fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub main_delivery_address_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub tel: Option<String>,
}

/// A client row matched by email, with whatever default-address hint the CRM
/// returned inline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingClient {
    pub id: String,
    pub default_address_id: Option<String>,
}

/// A catalog item resolved by product code. `id` and `unit_amount` are
/// passed back into estimate rows verbatim, in whatever scalar shape the
/// CRM returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: Value,
    pub name: String,
    pub unit_amount: Value,
    pub tax_id: Option<Value>,
}

/// Everything needed to create one quote document.
#[derive(Debug, Clone)]
pub struct EstimateData {
    pub client_id: String,
    pub contact_id: Option<String>,
    pub billing_address_id: Option<String>,
    pub delivery_address_id: Option<String>,
    pub subject: String,
    pub products: Vec<SelectedProduct>,
    pub product_notes: String,
    pub notes: String,
}

/// High-level Sellsy operations, generic over the transport.
#[derive(Clone)]
pub struct SellsyApi {
    transport: Arc<dyn SellsyTransport>,
}

impl SellsyApi {
    pub fn new(transport: Arc<dyn SellsyTransport>) -> Self {
        Self { transport }
    }

    /// Production wiring: HTTP transport from an explicit config.
    pub fn over_http(config: SellsyConfig) -> Result<Self, SellsyError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// `Client.create`: person or organization, chosen by company-name
    /// presence, optionally embedding the main postal address and a sticky
    /// note. Returns the raw envelope.
    pub async fn create_client(&self, client: &ClientData) -> Result<Value, SellsyError> {
        let is_corporation = !client.company_name.is_empty();

        let mut third = Map::new();
        let name = if is_corporation {
            client.company_name.clone()
        } else {
            client.name.clone()
        };
        third.insert("name".into(), json!(name));
        third.insert("email".into(), json!(client.email));
        third.insert("mobile".into(), json!(client.phone));
        third.insert("tel".into(), json!(client.phone));
        third.insert(
            "type".into(),
            json!(if is_corporation { "corporation" } else { "person" }),
        );

        if !client.siren.is_empty() {
            third.insert("siren".into(), json!(client.siren));
        }
        if !client.siret.is_empty() {
            third.insert("siret".into(), json!(client.siret));
        }

        if !client.address.is_empty() {
            let mut address = Map::new();
            address.insert("name".into(), json!("Adresse principale"));
            address.insert("part1".into(), json!(client.address));
            address.insert("zip".into(), json!(client.postal_code));
            address.insert("town".into(), json!(client.city));
            address.insert("countrycode".into(), json!(country_code(&client.country)));
            if !client.first_name.is_empty() || !client.last_name.is_empty() {
                let mut part2 = format!("{} {}", client.first_name, client.last_name)
                    .trim()
                    .to_string();
                if !client.company_name.is_empty() {
                    part2.push_str(&format!(" - {}", client.company_name));
                }
                if !part2.is_empty() {
                    address.insert("part2".into(), json!(part2));
                }
            }
            third.insert("address".into(), Value::Object(address));
        }

        if !client.notes.is_empty() {
            third.insert("stickyNote".into(), json!(client.notes));
        }

        if !is_corporation {
            third.insert("people_forename".into(), json!(client.first_name));
            third.insert("people_name".into(), json!(client.last_name));
        }

        self.transport
            .call("Client.create", json!({ "third": third }))
            .await
    }

    /// `Peoples.create`: a contact person linked to an existing client.
    pub async fn create_contact(
        &self,
        client: &ClientData,
        third_id: &str,
    ) -> Result<Value, SellsyError> {
        let people = json!({
            "forename": client.first_name,
            "name": client.last_name,
            "email": client.email,
            "tel": client.phone,
            "mobile": client.phone,
            "thirdids": [third_id],
        });
        self.transport
            .call("Peoples.create", json!({ "people": people }))
            .await
    }

    /// `Client.addAddress`, tagged billing or delivery. Delivery addresses
    /// carry the recipient's name/company in the secondary address line.
    pub async fn add_address(
        &self,
        address: &AddressData,
        third_id: &str,
        kind: AddressKind,
    ) -> Result<Value, SellsyError> {
        let mut params = Map::new();
        params.insert("thirdid".into(), json!(third_id));
        params.insert("name".into(), json!(kind.label()));
        params.insert("part1".into(), json!(address.address));
        params.insert("zip".into(), json!(address.postal_code));
        params.insert("town".into(), json!(address.city));
        params.insert("countrycode".into(), json!(country_code(&address.country)));

        if kind == AddressKind::Delivery {
            let mut part2 = format!("{} {}", address.first_name, address.last_name)
                .trim()
                .to_string();
            if !address.company_name.is_empty() {
                if part2.is_empty() {
                    part2 = address.company_name.clone();
                } else {
                    part2.push_str(&format!(" - {}", address.company_name));
                }
            }
            if !part2.is_empty() {
                params.insert("part2".into(), json!(part2));
            }
        }

        self.transport
            .call(
                "Client.addAddress",
                json!({
                    "clientid": client_id_value(third_id),
                    "address": params,
                }),
            )
            .await
    }

    /// `Client.getList` restricted by a contains-search on the email, then
    /// an exact case-insensitive match among the first page of results.
    pub async fn search_client_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ExistingClient>, SellsyError> {
        let envelope = self
            .transport
            .call(
                "Client.getList",
                json!({
                    "search": { "contains": email },
                    "pagination": { "nbperpage": 10, "pagenum": 1 },
                }),
            )
            .await?;

        let Some(payload) = response::success_payload(&envelope) else {
            return Ok(None);
        };
        let Some(result) = payload.get("result") else {
            return Ok(None);
        };

        let Value::Object(clients) = result else {
            // An empty result comes back as a list.
            return Ok(None);
        };

        for (key, client) in clients {
            let matches = client
                .get("email")
                .and_then(Value::as_str)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(email));
            if !matches {
                continue;
            }
            let id = id_field(client, "id")
                .or_else(|| id_field(client, "thirdid"))
                .unwrap_or_else(|| key.clone());
            return Ok(Some(ExistingClient {
                id,
                default_address_id: default_address_hint(client),
            }));
        }
        Ok(None)
    }

    /// `Client.getOne`.
    pub async fn client_by_id(&self, client_id: &str) -> Result<Option<Value>, SellsyError> {
        let envelope = self
            .transport
            .call("Client.getOne", json!({ "clientid": client_id }))
            .await?;
        Ok(response::success_payload(&envelope).cloned())
    }

    /// `Address.getList` for one client.
    pub async fn client_addresses(&self, client_id: &str) -> Result<Option<Value>, SellsyError> {
        let envelope = self
            .transport
            .call(
                "Address.getList",
                json!({ "search": { "thirdid": client_id } }),
            )
            .await?;
        Ok(response::success_payload(&envelope).cloned())
    }

    /// `Client.update` of the selected mutable fields.
    pub async fn update_client(
        &self,
        client_id: &str,
        update: &ClientUpdate,
    ) -> Result<Value, SellsyError> {
        let mut third = Map::new();
        let fields = [
            ("maindelivaddressid", &update.main_delivery_address_id),
            ("name", &update.name),
            ("email", &update.email),
            ("mobile", &update.mobile),
            ("tel", &update.tel),
        ];
        for (wire_name, value) in fields {
            if let Some(value) = value {
                third.insert(wire_name.into(), json!(value));
            }
        }
        self.transport
            .call(
                "Client.update",
                json!({ "clientid": client_id, "third": third }),
            )
            .await
    }

    /// Resolve a catalog item by product code: normalize the variant suffix,
    /// search `Catalogue.getList` by name, and keep the first item whose
    /// name starts with the normalized code.
    pub async fn find_catalog_item(&self, code: &str) -> Result<Option<CatalogItem>, SellsyError> {
        let search_code = normalize_variant_code(code);
        let envelope = self
            .transport
            .call(
                "Catalogue.getList",
                json!({
                    "type": "item",
                    "search": { "name": search_code },
                    "pagination": { "nbperpage": 5, "pagenum": 1 },
                }),
            )
            .await?;

        let Some(payload) = response::success_payload(&envelope) else {
            return Ok(None);
        };
        let Some(result) = payload.get("result") else {
            return Ok(None);
        };

        let items: Vec<&Value> = match result {
            Value::Object(map) => map.values().collect(),
            Value::Array(list) => list.iter().collect(),
            _ => Vec::new(),
        };

        for item in items {
            let name = item.get("name").and_then(Value::as_str).unwrap_or("");
            if name.starts_with(&search_code) {
                return Ok(Some(CatalogItem {
                    id: item.get("id").cloned().unwrap_or(Value::Null),
                    name: name.to_string(),
                    unit_amount: item.get("unitAmount").cloned().unwrap_or(Value::Null),
                    tax_id: item.get("taxid").cloned(),
                }));
            }
        }
        Ok(None)
    }

    /// `Document.create` for a quote: one row per ordered product, resolved
    /// against the remote catalog product by product, plus an optional
    /// trailing comment row with the customer's notes.
    pub async fn create_estimate(&self, estimate: &EstimateData) -> Result<Value, SellsyError> {
        let mut rows = Vec::with_capacity(estimate.products.len() + 1);
        for product in &estimate.products {
            let code = product.product_code.trim();
            let item = if code.is_empty() {
                None
            } else {
                match self.find_catalog_item(code).await {
                    Ok(item) => item,
                    Err(err) => {
                        warn!(code, error = %err, "catalog lookup failed; falling back to free text");
                        None
                    }
                }
            };
            match item {
                Some(item) => {
                    debug!(code, item = %item.name, "quote line linked to catalog item");
                    rows.push(linked_row(product, &item));
                }
                None => rows.push(free_text_row(product)),
            }
        }

        if !estimate.product_notes.is_empty() {
            rows.push(json!({
                "row_type": "comment",
                "row_comment": format!("Notes du client:\n{}", estimate.product_notes),
            }));
        }

        let mut row_map = Map::new();
        for (index, row) in rows.into_iter().enumerate() {
            row_map.insert((index + 1).to_string(), row);
        }

        let mut document = Map::new();
        document.insert("doctype".into(), json!("estimate"));
        document.insert("thirdid".into(), json!(estimate.client_id));
        document.insert("subject".into(), json!(estimate.subject));
        document.insert(
            "displayedDate".into(),
            json!(chrono::Utc::now().timestamp()),
        );
        document.insert("notes".into(), json!(estimate.notes));
        if let Some(contact_id) = &estimate.contact_id {
            document.insert("contactid".into(), json!(contact_id));
        }
        if let Some(billing_id) = &estimate.billing_address_id {
            document.insert("thirdaddressid".into(), json!(billing_id));
        }
        if let Some(delivery_id) = &estimate.delivery_address_id {
            document.insert("shipaddressid".into(), json!(delivery_id));
        }

        self.transport
            .call(
                "Document.create",
                json!({ "document": document, "row": row_map }),
            )
            .await
    }
}

/// Map the variant marker to its catalog-internal numeric code:
/// "050612DC" is looked up as "050612123".
pub fn normalize_variant_code(code: &str) -> String {
    match code.strip_suffix(VARIANT_SUFFIX) {
        Some(prefix) => format!("{prefix}{VARIANT_CATALOG_CODE}"),
        None => code.to_string(),
    }
}

/// ISO country code expected by the CRM: "France" maps to "FR", anything
/// else is truncated to its first two letters, defaulting to "FR".
fn country_code(country: &str) -> String {
    if country.is_empty() || country == "France" {
        "FR".to_string()
    } else {
        country.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// Client ids are numeric in the CRM; send a number when the id parses,
/// the raw string otherwise.
fn client_id_value(id: &str) -> Value {
    match id.parse::<i64>() {
        Ok(numeric) => json!(numeric),
        Err(_) => json!(id),
    }
}

/// Quote line for a product resolved in the remote catalog: linked to the
/// item, priced from the catalog.
fn linked_row(product: &SelectedProduct, item: &CatalogItem) -> Value {
    let mut row = Map::new();
    row.insert("row_type".into(), json!("item"));
    row.insert("row_linkedid".into(), item.id.clone());
    row.insert("row_qt".into(), json!(product.quantity));
    row.insert("row_unitAmount".into(), item.unit_amount.clone());
    row.insert("row_tax".into(), json!(LINE_TAX_RATE));

    if !product.workshop_reference.is_empty() {
        row.insert("row_name".into(), json!(product.workshop_reference));
    }
    if let Some(notes) = line_notes(product, true) {
        row.insert("row_notes".into(), json!(notes));
    }
    Value::Object(row)
}

/// Free-text quote line for an unresolved code, at the nominal placeholder
/// price. The workshop reference labels the line when present, else the
/// commercial name.
fn free_text_row(product: &SelectedProduct) -> Value {
    let label = if !product.workshop_reference.is_empty() {
        product.workshop_reference.clone()
    } else if !product.commercial_name.is_empty() {
        product.commercial_name.clone()
    } else {
        "Produit".to_string()
    };

    let mut row = Map::new();
    row.insert("row_type".into(), json!("item"));
    row.insert("row_name".into(), json!(label));
    row.insert("row_qt".into(), json!(product.quantity));
    row.insert("row_unitAmount".into(), json!(PLACEHOLDER_PRICE));
    row.insert("row_unit".into(), json!("unité"));
    row.insert("row_tax".into(), json!(LINE_TAX_RATE));

    if let Some(notes) = line_notes(product, false) {
        row.insert("row_notes".into(), json!(notes));
    }
    Value::Object(row)
}

/// Row notes: the house description when present, else a built summary of
/// the selected product.
fn line_notes(product: &SelectedProduct, resolved: bool) -> Option<String> {
    if !product.house_description.is_empty() {
        return Some(product.house_description.clone());
    }

    let mut details = Vec::new();
    if resolved {
        if !product.product_code.is_empty() {
            details.push(format!("Code: {}", product.product_code));
            if product.product_code.contains(VARIANT_SUFFIX) {
                details.push("Variante: DOS AVEC CHEVALET".to_string());
            }
        }
        if !product.frame_size.is_empty() {
            details.push(format!("Taille: {}", product.frame_size));
        }
        if !product.commercial_name.is_empty() {
            details.push(format!("Nom: {}", product.commercial_name));
        }
    } else {
        if !product.product_code.is_empty() {
            details.push(format!("Réf: {}", product.product_code));
        }
        if !product.frame_size.is_empty() {
            details.push(format!("Taille: {}", product.frame_size));
        }
    }

    if details.is_empty() {
        None
    } else {
        Some(details.join(" | "))
    }
}
