//! Driving port for the video proof upload flow.
//!
//! The flow has three phases. The client asks for a write URL, sends the
//! bytes straight to storage, then confirms. Only the first and last phases
//! pass through this port.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::domain::{Actor, Assignment, AssignmentId, Error, ObjectKey, UserId};

use super::PresignedUrl;

/// Request for a write-capable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUploadUrlRequest {
    pub client_id: UserId,
    pub assignment_id: AssignmentId,
    pub content_type: String,
}

/// Where to send the bytes, and the key to quote when confirming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub url: Url,
    pub object_key: ObjectKey,
    pub expires_in: Duration,
}

/// Caller-reported metadata for an upload that reached storage.
///
/// Size and content type are taken on trust; storage is not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmUploadRequest {
    pub client_id: UserId,
    pub assignment_id: AssignmentId,
    pub object_key: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// Request for a read URL to an assignment's linked video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadUrlRequest {
    pub viewer: Actor,
    pub assignment_id: AssignmentId,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoUpload: Send + Sync {
    /// Issue a short-lived write URL. Nothing is persisted.
    ///
    /// Fails with `upload_not_allowed` while the assignment awaits review.
    async fn request_upload_url(
        &self,
        request: RequestUploadUrlRequest,
    ) -> Result<UploadTicket, Error>;

    /// Record the upload and move the assignment to `submitted`.
    ///
    /// Persistence failures are reported as `confirmation_failed`; an
    /// orphaned record is removed first.
    async fn confirm_upload(&self, request: ConfirmUploadRequest) -> Result<Assignment, Error>;

    /// Issue a short-lived read URL for the linked upload.
    ///
    /// `upload_missing` when nothing is linked yet; `data_consistency_fault`
    /// when the linked record no longer exists.
    async fn download_url(&self, request: DownloadUrlRequest) -> Result<PresignedUrl, Error>;
}
