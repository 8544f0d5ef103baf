//! Typed client for the upstream conversation API.
//!
//! Only the conversation variables endpoint is covered:
//! - `GET {base}/conversations/{id}/variables` with bearer auth
//! - raw JSON relay for the proxy route
//! - decoded pages for the HTML panel

pub mod config;
pub mod error;
pub mod types;

pub use config::UpstreamConfig;
pub use error::UpstreamError;
pub use types::{ConversationVariable, VariablesPage, VariablesQuery};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

/// HTTP client bound to one upstream application.
pub struct UpstreamClient {
    config: UpstreamConfig,
    client: reqwest::Client,
}

impl UpstreamClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the API key is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Self::build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Build an HTTP client carrying the auth headers.
    fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, UpstreamError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| UpstreamError::Config("API key is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| UpstreamError::HttpClient(e.to_string()))
    }

    /// Fetch the variables of a conversation and return the upstream body as-is.
    ///
    /// # Errors
    /// Returns [`UpstreamError::Api`] when the upstream answers with a
    /// non-success status, or a transport error when the request fails.
    pub async fn get_conversation_variables(
        &self,
        conversation_id: &str,
        query: &VariablesQuery,
    ) -> Result<Value, UpstreamError> {
        let url = self.build_url(conversation_id, query)?;
        tracing::debug!("Fetching conversation variables: {conversation_id}");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!("Could not read upstream error body: {e}");
                    String::new()
                }
            };
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown Error").to_string());
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Upstream API error for conversation {conversation_id}"
            );
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Fetch the variables of a conversation as a typed page.
    ///
    /// # Errors
    /// Same failure modes as [`Self::get_conversation_variables`], plus a
    /// decoding error when the body does not match the page shape.
    pub async fn list_variables(
        &self,
        conversation_id: &str,
        query: &VariablesQuery,
    ) -> Result<VariablesPage, UpstreamError> {
        let body = self.get_conversation_variables(conversation_id, query).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Build the endpoint URL with query parameters.
    fn build_url(&self, conversation_id: &str, query: &VariablesQuery) -> Result<url::Url, UpstreamError> {
        let mut url = url::Url::parse(&self.config.base_url)?;

        url.path_segments_mut()
            .map_err(|()| UpstreamError::Config(format!("API base URL cannot carry a path: {}", self.config.base_url)))?
            .pop_if_empty()
            .extend(["conversations", conversation_id, "variables"]);

        {
            let mut params = url.query_pairs_mut();
            params.append_pair("user", &query.user);

            if let Some(limit) = query.limit {
                params.append_pair("limit", &limit.to_string());
            }

            if let Some(last_id) = query.last_id.as_deref().filter(|id| !id.is_empty()) {
                params.append_pair("last_id", last_id);
            }
        }

        Ok(url)
    }
}

/// Pull a non-empty `message` out of an upstream error body.
fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(String::from)
}
