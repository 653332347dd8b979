use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin HTTP client for the external appointment store.
///
/// The store is the single source of truth: every conflict check the core
/// performs before a write is advisory, and the store re-verifies at
/// commit time. This client only moves records back and forth; it never
/// interprets them.
pub struct AgendaStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AgendaStoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("x-api-key", key);
        }
        if let Some(token) = auth_token {
            if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, bearer);
            }
        }

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.headers(auth_token));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
