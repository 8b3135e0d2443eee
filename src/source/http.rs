use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::Source;
use crate::error::{Error, Result, SourceError};

/// Serves a database published over HTTP, such as `https://vuln.go.dev`.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// Creates a source rooted at `base_url`; every request is abandoned
    /// after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| {
                Error::fetch(
                    "new_source",
                    SourceError::Http {
                        key: base_url.to_string(),
                        source,
                    },
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, SourceError> {
        let http_err = |source| SourceError::Http {
            key: key.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.url(key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(http_err)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound {
                key: key.to_string(),
            }),
            status if !status.is_success() => Err(SourceError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            }),
            _ => Ok(response.bytes().await.map_err(http_err)?.to_vec()),
        }
    }
}
