//! Order submission workflow.
//!
//! One order is forwarded to the CRM as a strictly sequential, best-effort
//! sequence of calls: resolve the client, create addresses, create the
//! quote. Nothing is retried and nothing is transactional, so a later-step
//! failure leaves earlier side effects (created client/address) in place.
//! Every failure short of a lost client identifier degrades into a fallback
//! instead of aborting.

pub mod policy;
pub mod workflow;

pub use workflow::{CrmOutcome, OrderError, OrderSubmitter, OrderWorkflow};
