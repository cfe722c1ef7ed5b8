//! Settings for the order API client, read from the environment.

use std::time::Duration;
use tracing::info;
use crate::application::import_executor::ExecutorOptions;
use crate::domain::error::ImportError;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the backend API; orders are posted to `{base_url}/orders`.
    pub base_url: String,
    pub auth_token: Option<String>,
    /// Upper bound per create-order call. `None` waits indefinitely.
    pub row_timeout: Option<Duration>,
}

impl ApiConfig {
    /// Loads `ORDER_API_URL`, `ORDER_API_TOKEN` and `ORDER_IMPORT_ROW_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ImportError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ImportError> {
        let base_url = lookup("ORDER_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let auth_token = lookup("ORDER_API_TOKEN").filter(|v| !v.trim().is_empty());

        let row_timeout = match lookup("ORDER_IMPORT_ROW_TIMEOUT_MS") {
            Some(raw) if !raw.trim().is_empty() => {
                let millis: u64 = raw.trim().parse().map_err(|_| {
                    ImportError::Config(format!("ORDER_IMPORT_ROW_TIMEOUT_MS must be a number of milliseconds, got '{}'", raw))
                })?;
                if millis == 0 {
                    return Err(ImportError::Config("ORDER_IMPORT_ROW_TIMEOUT_MS must be greater than zero".to_string()));
                }
                Some(Duration::from_millis(millis))
            }
            _ => None,
        };

        info!("Order API: {} (token: {}, row timeout: {:?})", base_url, auth_token.is_some(), row_timeout);

        Ok(Self {
            base_url,
            auth_token,
            row_timeout,
        })
    }

    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            row_timeout: self.row_timeout,
            cancellation: None,
        }
    }
}
