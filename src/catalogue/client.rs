//! Catalogue Client Module
//!
//! Named-operation access to the remote mod catalogue.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::CatalogueError;

/// Remote catalogue, addressed by operation name.
#[async_trait]
pub trait CatalogueClient: Send + Sync {
    async fn call(
        &self,
        api_key: &str,
        operation: &str,
        args: &[Value],
    ) -> Result<Value, CatalogueError>;
}

// == HTTP Relay Client ==
/// Posts each call to a relay at `{base_url}/{operation}`.
///
/// The API key travels in the `apikey` header, the arguments as a JSON array
/// body. The relay answers with the operation's JSON result.
#[derive(Debug, Clone)]
pub struct HttpCatalogueClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogueClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogueClient for HttpCatalogueClient {
    async fn call(
        &self,
        api_key: &str,
        operation: &str,
        args: &[Value],
    ) -> Result<Value, CatalogueError> {
        let url = format!("{}/{}", self.base_url, operation);
        debug!(%operation, "Calling catalogue relay");

        let response = self
            .client
            .post(&url)
            .header("apikey", api_key)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogueError::remote(format!("{status}: {body}")));
        }

        Ok(response.json().await?)
    }
}
