//! S3-compatible `ObjectStorage` adapter.
//!
//! Presigning is local; only deletions touch the network. URLs handed to
//! clients are signed against the public endpoint when one is configured,
//! because the signature covers the `host` header the client will send.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::domain::ports::{ObjectStorage, ObjectStorageError, PresignedUrl};
use crate::domain::{ObjectKey, VideoContentType};

use super::sigv4::{Credentials, PresignRequest, SigningError, presign};

/// Lifetime of the internal URL used to issue a delete.
const DELETE_URL_TTL: Duration = Duration::from_secs(60);

/// How object URLs are formed from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Addressing {
    /// `https://endpoint/bucket/key`; required by most self-hosted gateways.
    #[default]
    Path,
    /// `https://bucket.endpoint/key`.
    VirtualHosted,
}

/// Connection settings for one bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: Url,
    pub public_endpoint: Option<Url>,
    pub region: String,
    pub bucket: String,
    pub addressing: Addressing,
    pub credentials: Credentials,
    pub request_timeout: Duration,
}

/// Object storage gateway speaking the S3 presigned URL protocol.
pub struct S3ObjectStorage {
    client: Client,
    settings: S3Settings,
    clock: Arc<dyn Clock>,
}

impl S3ObjectStorage {
    /// Build the adapter with a reqwest client bounded by the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: S3Settings, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.request_timeout).build()?;
        Ok(Self {
            client,
            settings,
            clock,
        })
    }

    fn client_endpoint(&self) -> &Url {
        self.settings
            .public_endpoint
            .as_ref()
            .unwrap_or(&self.settings.endpoint)
    }

    fn locate(&self, endpoint: &Url, key: &ObjectKey) -> Result<(Url, String), ObjectStorageError> {
        let bucket = self.settings.bucket.as_str();
        match self.settings.addressing {
            Addressing::Path => Ok((endpoint.clone(), format!("/{bucket}/{}", key.as_str()))),
            Addressing::VirtualHosted => {
                let host = endpoint.host_str().ok_or_else(|| {
                    ObjectStorageError::signing(format!("endpoint {endpoint} has no host"))
                })?;
                let mut located = endpoint.clone();
                located
                    .set_host(Some(&format!("{bucket}.{host}")))
                    .map_err(|err| ObjectStorageError::signing(err.to_string()))?;
                Ok((located, format!("/{}", key.as_str())))
            }
        }
    }

    fn sign(
        &self,
        method: &str,
        endpoint: &Url,
        key: &ObjectKey,
        headers: &[(&str, &str)],
        expires_in: Duration,
    ) -> Result<Url, ObjectStorageError> {
        let (endpoint, path) = self.locate(endpoint, key)?;
        presign(
            &self.settings.credentials,
            &PresignRequest {
                method,
                endpoint: &endpoint,
                path: &path,
                region: &self.settings.region,
                expires_in,
                headers,
                signed_at: self.clock.utc(),
            },
        )
        .map_err(map_signing_error)
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn presign_put(
        &self,
        key: &ObjectKey,
        content_type: &VideoContentType,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        let url = self.sign(
            "PUT",
            self.client_endpoint(),
            key,
            &[("content-type", content_type.as_str())],
            expires_in,
        )?;
        Ok(PresignedUrl { url, expires_in })
    }

    async fn presign_get(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        let url = self.sign("GET", self.client_endpoint(), key, &[], expires_in)?;
        Ok(PresignedUrl { url, expires_in })
    }

    async fn delete_object(&self, key: &ObjectKey) -> Result<(), ObjectStorageError> {
        let url = self.sign("DELETE", &self.settings.endpoint, key, &[], DELETE_URL_TTL)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            debug!(key = key.as_str(), status = status.as_u16(), "object deleted");
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_signing_error(error: SigningError) -> ObjectStorageError {
    ObjectStorageError::signing(error.to_string())
}

fn map_transport_error(error: reqwest::Error) -> ObjectStorageError {
    ObjectStorageError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ObjectStorageError {
    if status.is_server_error() {
        return ObjectStorageError::connection(format!("status {}", status.as_u16()));
    }
    ObjectStorageError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    compact.chars().take(PREVIEW_CHAR_LIMIT).collect()
}

#[cfg(test)]
#[path = "s3_object_storage_tests.rs"]
mod tests;
