//! HTTP transport for remote functions.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use super::{GatewayError, RemoteGateway};
use crate::config::GatewayConfig;

/// Calls remote functions with `POST {base_url}{functions_path}/{name}`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Builds a gateway for the configured host.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError::Client` if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("der-microgrid/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self::with_client(config, client))
    }

    /// Builds a gateway around an existing client.
    pub fn with_client(config: &GatewayConfig, client: reqwest::Client) -> Self {
        let endpoint = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.functions_path.trim_matches('/')
        );
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Full URL for `function`.
    pub fn url_for(&self, function: &str) -> String {
        format!("{}/{function}", self.endpoint)
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn call(&self, function: &str, payload: Value) -> Result<Value, GatewayError> {
        let url = self.url_for(function);
        let transport = |source| GatewayError::Transport {
            function: function.to_string(),
            source,
        };

        debug!(%url, "calling remote function");
        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "remote function answered");

        if !status.is_success() {
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                message: remote_message(status.as_u16(), &body),
            });
        }

        serde_json::from_str(&body).map_err(|source| GatewayError::Decode {
            function: function.to_string(),
            source,
        })
    }
}

/// Extracts the operator-facing message from an error response body.
///
/// Prefers an `error` or `message` string field of a JSON object body, then
/// the trimmed body text, then `HTTP <status>`.
fn remote_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        let field = ["error", "message"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str));
        if let Some(msg) = field {
            return msg.to_string();
        }
    }
    let text = body.trim();
    if text.is_empty() {
        format!("HTTP {status}")
    } else {
        text.to_string()
    }
}
