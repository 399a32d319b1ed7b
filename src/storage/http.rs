//! HTTP storage backend.
//!
//! Thin reqwest layer over the storage service's API. Every non-success
//! status becomes `Error::Transport { status }`; 429 is not special
//! here, callers distinguish it via `Error::is_rate_limited()`. The
//! record travels base64-encoded inside JSON on create and as a raw
//! body on fetch.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::codec::Identifier;
use crate::error::Error;
use crate::storage::StorageBackend;

pub struct HttpStorage {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CreateResponse {
    identifier: String,
}

impl HttpStorage {
    /// `base_url` is the service root, e.g. `https://prv.ec`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client: reqwest::Client::new(), base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl StorageBackend for HttpStorage {
    async fn create(
        &self,
        record_bytes: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<Identifier, Error> {
        let resp = self
            .client
            .post(self.endpoint("/v1/private"))
            .json(&json!({
                "record": STANDARD.encode(record_bytes),
                "expiry": expiry.timestamp(),
            }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(Error::Transport { status });
        }

        let body: CreateResponse = resp.json().await?;
        let identifier = Identifier::new(body.identifier)?;
        debug!(identifier = %identifier, "blinded record created");
        Ok(identifier)
    }

    async fn fetch(&self, identifier: &Identifier) -> Result<Option<Vec<u8>>, Error> {
        let resp = self
            .client
            .get(self.endpoint(&format!("/v1/private/{identifier}")))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 404 {
            debug!(identifier = %identifier, "no record (absent or expired)");
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Error::Transport { status });
        }

        Ok(Some(resp.bytes().await?.to_vec()))
    }

    async fn create_plaintext(
        &self,
        captcha_response: &str,
        long_url: &str,
    ) -> Result<Identifier, Error> {
        let resp = self
            .client
            .post(self.endpoint("/v1/public"))
            .json(&json!({
                "user_captcha_response": captcha_response,
                "long_url": long_url,
            }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(Error::Transport { status });
        }

        let slug = resp.text().await?;
        Identifier::new(slug.trim())
    }
}
