//! Port for the object storage gateway holding uploaded videos.
//!
//! The core never proxies bytes. It asks the gateway for time-limited URLs
//! and, when cleaning up, for deletions. Expiry is enforced by the gateway.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::domain::{Error, ObjectKey, VideoContentType};

use super::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// The gateway could not be reached.
        Connection { message: String } => "object storage connection failed: {message}",
        /// A URL could not be produced for the key.
        Signing { message: String } => "object storage signing failed: {message}",
        /// The gateway answered with an error status.
        Rejected { status: u16, message: String } =>
            "object storage rejected the request with status {status}: {message}",
    }
}

impl From<ObjectStorageError> for Error {
    fn from(error: ObjectStorageError) -> Self {
        tracing::debug!(error = %error, "object storage failure");
        match error {
            ObjectStorageError::Connection { .. } => {
                Error::service_unavailable("object storage unavailable")
            }
            ObjectStorageError::Signing { .. } | ObjectStorageError::Rejected { .. } => {
                Error::gateway_failure("object storage error")
            }
        }
    }
}

/// A capability URL for one operation on one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    pub url: Url,
    pub expires_in: Duration,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Issue a write URL accepting a body of `content_type` at `key`.
    async fn presign_put(
        &self,
        key: &ObjectKey,
        content_type: &VideoContentType,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError>;

    /// Issue a read URL for `key`.
    async fn presign_get(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError>;

    /// Remove the object. Deleting a missing object succeeds.
    async fn delete_object(&self, key: &ObjectKey) -> Result<(), ObjectStorageError>;
}

/// Fixture gateway issuing URLs under a reserved host.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObjectStorage;

impl FixtureObjectStorage {
    fn url_for(key: &ObjectKey, expires_in: Duration) -> Result<PresignedUrl, ObjectStorageError> {
        let url = Url::parse("https://storage.invalid/")
            .and_then(|base| base.join(key.as_str()))
            .map_err(|err| ObjectStorageError::signing(err.to_string()))?;
        Ok(PresignedUrl { url, expires_in })
    }
}

#[async_trait]
impl ObjectStorage for FixtureObjectStorage {
    async fn presign_put(
        &self,
        key: &ObjectKey,
        _content_type: &VideoContentType,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        Self::url_for(key, expires_in)
    }

    async fn presign_get(
        &self,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> Result<PresignedUrl, ObjectStorageError> {
        Self::url_for(key, expires_in)
    }

    async fn delete_object(&self, _key: &ObjectKey) -> Result<(), ObjectStorageError> {
        Ok(())
    }
}
