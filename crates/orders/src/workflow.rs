use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use frameshop_core::OrderRequest;
use frameshop_sellsy::api::{AddressData, AddressKind, ClientData, ClientUpdate, EstimateData};
use frameshop_sellsy::response::{envelope_error, id_field, success_payload};
use frameshop_sellsy::SellsyApi;

use crate::policy;

/// Result of the CRM leg of one submission, as echoed back to the caller.
///
/// `success` here means "the CRM integration ran to the end", which is
/// distinct from the HTTP response's own success flag: a failed quote still
/// yields `success: true` with `message: "Erreur devis"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrmOutcome {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            client_id: None,
            estimate_id: None,
            message: None,
            error: Some(error),
        }
    }
}

/// Failures that abort the whole submission. Everything else degrades into
/// a fallback inside the workflow.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("client creation failed: {0}")]
    ClientCreation(String),

    #[error("no client id could be resolved")]
    ClientUnresolved,
}

/// Seam between the HTTP surface and the CRM workflow; lets the API run
/// against a test double.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, order: &OrderRequest) -> CrmOutcome;
}

/// State after client resolution, carried through the remaining steps.
#[derive(Debug, Clone)]
struct ResolvedClient {
    client_id: String,
    default_address_id: Option<String>,
}

/// The sequential order workflow over a Sellsy client.
pub struct OrderWorkflow {
    api: SellsyApi,
}

impl OrderWorkflow {
    pub fn new(api: SellsyApi) -> Self {
        Self { api }
    }

    async fn run(&self, order: &OrderRequest) -> Result<CrmOutcome, OrderError> {
        let client = self.resolve_client(order).await?;
        let delivery_id = self.create_delivery_address(order, &client).await;
        let billing_id = self
            .resolve_billing_address(order, &client, delivery_id.as_deref())
            .await;
        let estimate_id = self
            .create_quote(order, &client, delivery_id.as_deref(), billing_id.as_deref())
            .await;

        let message = if estimate_id.is_some() {
            "Devis créé"
        } else {
            "Erreur devis"
        };
        Ok(CrmOutcome {
            success: true,
            client_id: Some(client.client_id),
            estimate_id,
            message: Some(message.to_string()),
            error: None,
        })
    }

    /// Step 1: reuse the client matching the order's email, or create one.
    /// The only fatal step: without a client id nothing else can run.
    async fn resolve_client(&self, order: &OrderRequest) -> Result<ResolvedClient, OrderError> {
        let delivery = &order.delivery_address;

        let existing = match self.api.search_client_by_email(&delivery.email).await {
            Ok(existing) => existing,
            Err(err) => {
                warn!(error = %err, "client search failed; proceeding as new client");
                None
            }
        };

        if let Some(existing) = existing {
            info!(client_id = %existing.id, "reusing existing client");
            return Ok(ResolvedClient {
                client_id: existing.id,
                default_address_id: existing.default_address_id,
            });
        }

        let client_data = ClientData::from_delivery(delivery);
        let envelope = self
            .api
            .create_client(&client_data)
            .await
            .map_err(|err| OrderError::ClientCreation(err.to_string()))?;
        let payload = success_payload(&envelope)
            .ok_or_else(|| OrderError::ClientCreation(envelope_error(&envelope)))?;

        let client_id = id_field(payload, "client_id").ok_or(OrderError::ClientUnresolved)?;
        let default_address_id = id_field(payload, "addressid");
        info!(client_id = %client_id, "client created");

        if policy::wants_contact(
            &delivery.company_name,
            &delivery.first_name,
            &delivery.last_name,
        ) {
            if let Err(err) = self.api.create_contact(&client_data, &client_id).await {
                warn!(error = %err, "contact creation failed");
            }
        }

        Ok(ResolvedClient {
            client_id,
            default_address_id,
        })
    }

    /// Step 2: create the delivery address when a street address was given,
    /// pointing the client's default delivery address at it on success.
    async fn create_delivery_address(
        &self,
        order: &OrderRequest,
        client: &ResolvedClient,
    ) -> Option<String> {
        let delivery = &order.delivery_address;
        if delivery.address.is_empty() {
            return None;
        }

        let created = match self
            .api
            .add_address(
                &AddressData::delivery_of(delivery),
                &client.client_id,
                AddressKind::Delivery,
            )
            .await
        {
            Ok(envelope) => {
                let id = policy::created_address_id(&envelope);
                if id.is_none() {
                    warn!(error = %envelope_error(&envelope), "delivery address creation failed");
                }
                id
            }
            Err(err) => {
                warn!(error = %err, "delivery address creation failed");
                None
            }
        };

        if let Some(address_id) = &created {
            info!(address_id = %address_id, "delivery address created");
            let update = ClientUpdate {
                main_delivery_address_id: Some(address_id.clone()),
                ..ClientUpdate::default()
            };
            if let Err(err) = self.api.update_client(&client.client_id, &update).await {
                warn!(error = %err, "could not update default delivery address");
            }
        }

        policy::choose_delivery_address(true, created, client.default_address_id.as_deref())
    }

    /// Step 3: reuse the delivery address when billing is declared
    /// identical, else create a distinct billing address.
    async fn resolve_billing_address(
        &self,
        order: &OrderRequest,
        client: &ResolvedClient,
        delivery_id: Option<&str>,
    ) -> Option<String> {
        let delivery = &order.delivery_address;
        if delivery.billing_same_as_delivery() {
            return policy::choose_billing_address(
                true,
                None,
                delivery_id,
                client.default_address_id.as_deref(),
            );
        }

        let created = match self
            .api
            .add_address(
                &AddressData::billing_of(delivery),
                &client.client_id,
                AddressKind::Billing,
            )
            .await
        {
            Ok(envelope) => {
                let id = policy::created_address_id(&envelope);
                if id.is_none() {
                    warn!(error = %envelope_error(&envelope), "billing address creation failed");
                }
                id
            }
            Err(err) => {
                warn!(error = %err, "billing address creation failed");
                None
            }
        };
        if created.is_some() {
            info!(address_id = ?created, "billing address created");
        }

        policy::choose_billing_address(
            false,
            created,
            delivery_id,
            client.default_address_id.as_deref(),
        )
    }

    /// Step 4: create the quote document. A failure here is recorded in the
    /// outcome, never fatal.
    async fn create_quote(
        &self,
        order: &OrderRequest,
        client: &ResolvedClient,
        delivery_id: Option<&str>,
        billing_id: Option<&str>,
    ) -> Option<String> {
        let estimate = EstimateData {
            client_id: client.client_id.clone(),
            contact_id: None,
            billing_address_id: billing_id.map(str::to_string),
            delivery_address_id: delivery_id.map(str::to_string),
            subject: policy::quote_subject(&order.selected_products),
            products: order.selected_products.clone(),
            product_notes: order.product_notes.clone(),
            notes: order.delivery_address.notes.clone(),
        };

        match self.api.create_estimate(&estimate).await {
            Ok(envelope) => match success_payload(&envelope).and_then(|p| id_field(p, "doc_id")) {
                Some(estimate_id) => {
                    info!(estimate_id = %estimate_id, "quote created");
                    Some(estimate_id)
                }
                None => {
                    warn!(error = %envelope_error(&envelope), "quote creation failed");
                    None
                }
            },
            Err(err) => {
                warn!(error = %err, "quote creation failed");
                None
            }
        }
    }
}

#[async_trait]
impl OrderSubmitter for OrderWorkflow {
    async fn submit(&self, order: &OrderRequest) -> CrmOutcome {
        match self.run(order).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "order submission failed");
                CrmOutcome::failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use frameshop_core::{DeliveryAddress, SelectedProduct};
    use frameshop_sellsy::{MockTransport, SellsyError};

    fn order() -> OrderRequest {
        OrderRequest {
            selected_products: vec![SelectedProduct {
                product_code: "050612".to_string(),
                commercial_name: "GAELLE 50*61".to_string(),
                frame_size: "50*61".to_string(),
                quantity: 1,
                ..SelectedProduct::default()
            }],
            delivery_address: DeliveryAddress {
                first_name: "Jean".to_string(),
                last_name: "Dupont".to_string(),
                email: "jean@example.fr".to_string(),
                address: "1 rue de la Paix".to_string(),
                city: "Paris".to_string(),
                postal_code: "75002".to_string(),
                country: "France".to_string(),
                ..DeliveryAddress::default()
            },
            product_notes: String::new(),
        }
    }

    fn workflow(mock: Arc<MockTransport>) -> OrderWorkflow {
        OrderWorkflow::new(SellsyApi::new(mock))
    }

    /// Script the steps after client resolution: delivery address, client
    /// update, one catalog lookup, document creation.
    fn script_post_client_steps(mock: &MockTransport) {
        mock.push_success(json!({"address_id": 900}));
        mock.push_success(json!({"status": "ok"}));
        mock.push_success(json!({"result": {}}));
        mock.push_success(json!({"doc_id": 555}));
    }

    #[tokio::test]
    async fn existing_client_is_reused_without_creation() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({
            "result": {"300": {"id": 300, "email": "jean@example.fr", "addressid": 5}}
        }));
        script_post_client_steps(&mock);

        let outcome = workflow(mock.clone()).submit(&order()).await;

        assert!(outcome.success);
        assert_eq!(outcome.client_id, Some("300".to_string()));
        assert_eq!(outcome.estimate_id, Some("555".to_string()));
        assert_eq!(outcome.message, Some("Devis créé".to_string()));
        assert_eq!(
            mock.methods(),
            vec![
                "Client.getList",
                "Client.addAddress",
                "Client.update",
                "Catalogue.getList",
                "Document.create",
            ]
        );
    }

    #[tokio::test]
    async fn resubmission_with_same_email_keeps_the_client_id() {
        // Target property of the design: an email-based lookup at the start
        // of each run. Sequential resubmissions reuse the id; nothing
        // synchronizes CONCURRENT submissions, which can still race into
        // duplicate clients.
        let mock = Arc::new(MockTransport::new());
        for _ in 0..2 {
            mock.push_success(json!({
                "result": {"300": {"id": 300, "email": "jean@example.fr", "addressid": 5}}
            }));
            script_post_client_steps(&mock);
        }
        let workflow = workflow(mock.clone());

        let first = workflow.submit(&order()).await;
        let second = workflow.submit(&order()).await;

        assert_eq!(first.client_id, second.client_id);
        assert!(!mock.methods().contains(&"Client.create".to_string()));
    }

    #[tokio::test]
    async fn new_client_gets_created_with_contact_for_companies() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({"result": []}));
        mock.push_success(json!({"client_id": 42, "addressid": 7}));
        mock.push_success(json!({"people_id": 1}));
        script_post_client_steps(&mock);

        let mut order = order();
        order.delivery_address.company_name = "Dupont SARL".to_string();

        let outcome = workflow(mock.clone()).submit(&order).await;

        assert!(outcome.success);
        assert_eq!(outcome.client_id, Some("42".to_string()));
        assert_eq!(
            mock.methods(),
            vec![
                "Client.getList",
                "Client.create",
                "Peoples.create",
                "Client.addAddress",
                "Client.update",
                "Catalogue.getList",
                "Document.create",
            ]
        );
    }

    #[tokio::test]
    async fn person_without_company_gets_no_contact() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({"result": []}));
        mock.push_success(json!({"client_id": 42}));
        script_post_client_steps(&mock);

        workflow(mock.clone()).submit(&order()).await;

        assert!(!mock.methods().contains(&"Peoples.create".to_string()));
    }

    #[tokio::test]
    async fn failed_client_creation_aborts_the_submission() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({"result": []}));
        mock.push_envelope(json!({"status": "error", "error": "quota exceeded"}));

        let outcome = workflow(mock.clone()).submit(&order()).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("quota exceeded"));
        assert_eq!(outcome.client_id, None);
        // Nothing past the client step ran.
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn missing_client_id_in_creation_reply_is_fatal() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({"result": []}));
        mock.push_success(json!({"unexpected": true}));

        let outcome = workflow(mock).submit(&order()).await;

        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("no client id"));
    }

    #[tokio::test]
    async fn search_failure_degrades_to_client_creation() {
        let mock = Arc::new(MockTransport::new());
        mock.push_failure(SellsyError::Transport("timeout".to_string()));
        mock.push_success(json!({"client_id": 42}));
        script_post_client_steps(&mock);

        let outcome = workflow(mock.clone()).submit(&order()).await;

        assert!(outcome.success);
        assert_eq!(outcome.client_id, Some("42".to_string()));
        assert_eq!(mock.methods()[1], "Client.create");
    }

    #[tokio::test]
    async fn failed_delivery_address_falls_back_to_the_default() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({
            "result": {"300": {"id": 300, "email": "jean@example.fr", "addressid": 5}}
        }));
        mock.push_failure(SellsyError::Transport("timeout".to_string()));
        mock.push_success(json!({"result": {}}));
        mock.push_success(json!({"doc_id": 556}));

        let outcome = workflow(mock.clone()).submit(&order()).await;

        assert!(outcome.success);
        // No Client.update: there is no new address to promote.
        let methods = mock.methods();
        assert!(!methods.contains(&"Client.update".to_string()));

        // The estimate carries the pre-existing default address on both
        // delivery and billing (billing defaults to "same as delivery").
        let calls = mock.calls();
        let document = &calls.last().unwrap().1["document"];
        assert_eq!(document["shipaddressid"], json!("5"));
        assert_eq!(document["thirdaddressid"], json!("5"));
    }

    #[tokio::test]
    async fn no_street_address_skips_address_creation() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({
            "result": {"300": {"id": 300, "email": "jean@example.fr", "addressid": 5}}
        }));
        mock.push_success(json!({"result": {}}));
        mock.push_success(json!({"doc_id": 557}));

        let mut order = order();
        order.delivery_address.address = String::new();

        workflow(mock.clone()).submit(&order).await;

        let methods = mock.methods();
        assert!(!methods.contains(&"Client.addAddress".to_string()));

        // No delivery id at all; billing reuses the default.
        let calls = mock.calls();
        let document = &calls.last().unwrap().1["document"];
        assert!(document.get("shipaddressid").is_none());
        assert_eq!(document["thirdaddressid"], json!("5"));
    }

    #[tokio::test]
    async fn distinct_billing_address_is_created() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({
            "result": {"300": {"id": 300, "email": "jean@example.fr"}}
        }));
        mock.push_success(json!({"address_id": 900}));
        mock.push_success(json!({"status": "ok"}));
        mock.push_success(json!({"address_id": 901}));
        mock.push_success(json!({"result": {}}));
        mock.push_success(json!({"doc_id": 558}));

        let mut order = order();
        order.delivery_address.same_billing_address = "off".to_string();
        order.delivery_address.billing_address = "3 rue des Banques".to_string();
        order.delivery_address.billing_city = "Paris".to_string();

        workflow(mock.clone()).submit(&order).await;

        let calls = mock.calls();
        let document = &calls.last().unwrap().1["document"];
        assert_eq!(document["shipaddressid"], json!("900"));
        assert_eq!(document["thirdaddressid"], json!("901"));
    }

    #[tokio::test]
    async fn failed_quote_still_reports_an_overall_success() {
        let mock = Arc::new(MockTransport::new());
        mock.push_success(json!({
            "result": {"300": {"id": 300, "email": "jean@example.fr", "addressid": 5}}
        }));
        mock.push_success(json!({"address_id": 900}));
        mock.push_success(json!({"status": "ok"}));
        mock.push_success(json!({"result": {}}));
        mock.push_envelope(json!({"status": "error", "error": "document rejected"}));

        let outcome = workflow(mock).submit(&order()).await;

        assert!(outcome.success);
        assert_eq!(outcome.estimate_id, None);
        assert_eq!(outcome.message, Some("Erreur devis".to_string()));
    }
}
