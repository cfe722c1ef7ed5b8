use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};
use crate::config::ApiConfig;
use crate::domain::{
    error::ImportError,
    models::{CreateOrderResponse, OrderPayload},
    ports::OrderGateway,
};

const SESSION_EXPIRED: &str = "Session expired";

/// Creates orders through the backend's REST API (`POST {base_url}/orders`).
pub struct HttpOrderGateway {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpOrderGateway {
    pub fn new(base_url: String, auth_token: Option<String>) -> Self {
        debug!("Initializing order API client for {}", base_url);
        Self {
            client: Client::new(),
            base_url,
            auth_token,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone(), config.auth_token.clone())
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(&self, payload: &OrderPayload) -> Result<CreateOrderResponse, ImportError> {
        let url = self.orders_url();

        let mut request = self.client.post(&url).json(payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to reach {}: {}", url, e);
            ImportError::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!("Create-order responded with {}", status);
        if status == StatusCode::UNAUTHORIZED {
            warn!("Order API rejected the credentials");
            return Ok(CreateOrderResponse::rejected(SESSION_EXPIRED));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Create-order response from {} is not JSON: {}", url, e);
            ImportError::Decode(e.to_string())
        })?;

        Ok(interpret_response(&body))
    }
}

/// Anything other than `{"success": true, ...}` counts as a rejection.
fn interpret_response(body: &Value) -> CreateOrderResponse {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !success && body.get("success").is_none() {
        debug!("Create-order response has no success flag: {}", body);
    }
    CreateOrderResponse { success, message }
}
