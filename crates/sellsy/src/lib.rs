//! Sellsy v1 API client.
//!
//! The transport layer turns a method name and a parameter payload into the
//! API's envelope (OAuth 1.0 PLAINTEXT header, form body with a serialized
//! inner payload) and decodes the JSON reply. Method wrappers on top are thin
//! request/response shapes; they never panic across the CRM boundary, and
//! every remote failure is a [`SellsyError`] value.

pub mod api;
pub mod config;
pub mod mock;
pub mod response;
pub mod transport;

pub use api::{
    AddressData, AddressKind, CatalogItem, ClientData, EstimateData, ExistingClient, SellsyApi,
};
pub use config::SellsyConfig;
pub use mock::MockTransport;
pub use transport::{HttpTransport, SellsyTransport};

/// Errors crossing the CRM boundary.
///
/// Remote problems (network, timeout, non-2xx, bad body) are carried as
/// values; nothing inside this crate panics on a CRM failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SellsyError {
    #[error("config error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Transport(String),

    #[error("empty response from the CRM")]
    EmptyResponse,

    #[error("invalid CRM response: {0}")]
    InvalidResponse(String),
}
