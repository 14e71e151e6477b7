//! `frameshop-core` — shared order-domain types.
//!
//! This crate contains **pure data** carried between the HTTP surface and the
//! CRM workflow (no IO, no HTTP, no CRM specifics).

pub mod order;

pub use order::{DeliveryAddress, OrderRequest, SelectedProduct};
