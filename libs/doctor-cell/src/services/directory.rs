use std::sync::Arc;

use anyhow::{anyhow, Result};
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_store::AgendaStoreClient;

use crate::models::Doctor;

/// Read access to the doctor and specialty catalogs kept by the store.
pub struct DirectoryService {
    store: Arc<AgendaStoreClient>,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(AgendaStoreClient::new(config)),
        }
    }

    pub async fn list_doctors(
        &self,
        specialty: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Doctor>> {
        let path = match specialty {
            Some(specialty) => format!("/doctors?specialty={}", urlencoding::encode(specialty)),
            None => "/doctors".to_string(),
        };

        debug!("Listing doctors via {}", path);
        self.store
            .request(Method::GET, &path, Some(auth_token), None)
            .await
    }

    pub async fn list_specialties(&self, auth_token: &str) -> Result<Vec<String>> {
        self.store
            .request(Method::GET, "/specialties", Some(auth_token), None)
            .await
    }

    pub async fn add_specialty(&self, name: &str, auth_token: &str) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Specialty name must not be empty"));
        }

        let _: serde_json::Value = self
            .store
            .request(
                Method::POST,
                "/specialties",
                Some(auth_token),
                Some(json!({ "name": trimmed })),
            )
            .await?;

        debug!("Specialty '{}' added", trimmed);
        Ok(())
    }
}
