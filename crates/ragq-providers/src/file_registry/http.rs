//! HTTP adapter for the external file registry (§1, §4.L).

use async_trait::async_trait;
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::FileRegistryClient;
use serde::Deserialize;

use crate::config::HttpClientConfig;

#[derive(Deserialize)]
struct OwnershipResponse {
    owned: bool,
}

#[derive(Deserialize)]
struct FileNamesResponse {
    file_names: Vec<String>,
}

/// HTTP client for the persistent file registry's ownership and
/// enumeration contracts.
pub struct HttpFileRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFileRegistryClient {
    pub fn new(base_url: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Self {
            client: HttpClientConfig::default().build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl FileRegistryClient for HttpFileRegistryClient {
    async fn is_owned(&self, file_id: &str, user_id: &str) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/files/{file_id}/owner", self.base_url))
            .query(&[("userId", user_id)])
            .send()
            .await
            .map_err(|e| Error::internal(format!("file registry unreachable: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Error::internal(format!(
                "file registry returned status {}",
                response.status()
            )));
        }

        let body: OwnershipResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed file registry response: {e}"),
        })?;
        Ok(body.owned)
    }

    async fn list_file_names(&self, user_id: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/users/{user_id}/files", self.base_url))
            .send()
            .await
            .map_err(|e| Error::internal(format!("file registry unreachable: {e}")))?;

        let body: FileNamesResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed file registry response: {e}"),
        })?;
        Ok(body.file_names)
    }
}
