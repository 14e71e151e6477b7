//! Wire-level access to the Sellsy v1 endpoint.
//!
//! Every call posts a form body (`request=1`, `io_mode=json`, `do_in` holding
//! the serialized method + params) under an OAuth 1.0 PLAINTEXT header with a
//! fresh timestamp/nonce pair, after a fixed delay that respects the remote
//! rate limit.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{SellsyConfig, SellsyError};

/// Production endpoint of the v1 method-call API.
pub const BASE_URL: &str = "https://apifeed.sellsy.com/0";

/// Minimum delay applied before each call (remote rate limit).
pub const CALL_DELAY: Duration = Duration::from_secs(1);

/// One authenticated method call against the CRM.
///
/// Implementations return the decoded response envelope (`status` plus a
/// method-specific `response` payload) or a [`SellsyError`]; they never
/// panic on remote failures.
#[async_trait]
pub trait SellsyTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, SellsyError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    config: SellsyConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: SellsyConfig) -> Result<Self, SellsyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SellsyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// OAuth 1.0 header with PLAINTEXT signature, per the v1 documentation.
    fn authorization_header(&self, timestamp: i64, nonce: &str) -> String {
        let signature = format!(
            "{}&{}",
            percent_encode(&self.config.consumer_secret),
            percent_encode(&self.config.user_secret)
        );
        format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_token=\"{}\", \
             oauth_signature_method=\"PLAINTEXT\", oauth_timestamp=\"{}\", \
             oauth_nonce=\"{}\", oauth_version=\"1.0\", oauth_signature=\"{}\"",
            self.config.consumer_token, self.config.user_token, timestamp, nonce, signature
        )
    }
}

#[async_trait]
impl SellsyTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, SellsyError> {
        tokio::time::sleep(CALL_DELAY).await;

        let timestamp = chrono::Utc::now().timestamp();
        let nonce = Uuid::new_v4().simple().to_string();
        let do_in = serde_json::json!({ "method": method, "params": params }).to_string();

        debug!(method, "calling CRM");

        let response = self
            .client
            .post(BASE_URL)
            .header(
                reqwest::header::AUTHORIZATION,
                self.authorization_header(timestamp, &nonce),
            )
            .form(&[("request", "1"), ("io_mode", "json"), ("do_in", do_in.as_str())])
            .send()
            .await
            .map_err(|e| SellsyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SellsyError::Transport(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SellsyError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(SellsyError::EmptyResponse);
        }

        serde_json::from_str(&body).map_err(|_| {
            let head: String = body.chars().take(200).collect();
            SellsyError::InvalidResponse(head)
        })
    }
}

/// RFC 3986 percent-encoding of a credential for the PLAINTEXT signature.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
