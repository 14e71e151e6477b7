use std::env;
use std::time::Duration;

use crate::SellsyError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials and tuning for the Sellsy v1 API.
///
/// Built explicitly (usually via [`SellsyConfig::from_env`]) and passed down
/// to the transport; there is no global credential state.
#[derive(Debug, Clone)]
pub struct SellsyConfig {
    /// Long-lived consumer (application) token.
    pub consumer_token: String,
    pub consumer_secret: String,
    /// Long-lived user token of the private application.
    pub user_token: String,
    pub user_secret: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SellsyConfig {
    /// Read the configuration from `SELLSY_*` environment variables.
    pub fn from_env() -> Result<Self, SellsyError> {
        let timeout_secs = match env::var("SELLSY_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| SellsyError::Config(format!("invalid SELLSY_TIMEOUT_SECS: {raw}")))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            consumer_token: required_var("SELLSY_CONSUMER_TOKEN")?,
            consumer_secret: required_var("SELLSY_CONSUMER_SECRET")?,
            user_token: required_var("SELLSY_USER_TOKEN")?,
            user_secret: required_var("SELLSY_USER_SECRET")?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn required_var(name: &str) -> Result<String, SellsyError> {
    env::var(name).map_err(|_| SellsyError::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_name_the_variable() {
        // Env-var based; run the negative path only, against a name no other
        // test sets.
        let err = required_var("SELLSY_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("SELLSY_TEST_UNSET_VARIABLE"));
    }
}
