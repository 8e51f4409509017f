//! Video upload saga.
//!
//! Confirmation writes two records that cannot share a transaction: the
//! upload metadata and the assignment that points at it. The upload is
//! written first. If the assignment update then fails, the upload is an
//! orphan and [`compensate_orphaned_upload`] removes it before the caller
//! sees `confirmation_failed`.
//!
//! A re-submission replaces the assignment's video. Once the new upload is
//! linked, the one it replaced is removed the same way, so an assignment
//! keeps a single upload row.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info};

use super::authorization::OwnershipChain;
use super::ports::{
    AssignmentRepository, ConfirmUploadRequest, DownloadUrlRequest, ObjectStorage, PresignedUrl,
    RequestUploadUrlRequest, UploadRepository, UploadTicket, VideoUpload,
};
use super::{Assignment, Error, ObjectKey, Upload, UploadDraft, UploadId, VideoContentType};

/// Default lifetime of presigned URLs.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// Lifetimes of the URLs the saga hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSettings {
    pub upload_url_ttl: Duration,
    pub download_url_ttl: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            upload_url_ttl: DEFAULT_URL_TTL,
            download_url_ttl: DEFAULT_URL_TTL,
        }
    }
}

/// What compensation managed to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompensationOutcome {
    pub record_cleared: bool,
    pub object_cleared: bool,
}

/// Remove an upload record that no assignment references, then its object.
///
/// Failures are logged at error level and reported in the outcome. They are
/// never returned, so the caller's original error stays the one surfaced.
pub async fn compensate_orphaned_upload(
    uploads: &dyn UploadRepository,
    storage: &dyn ObjectStorage,
    upload: &Upload,
) -> CompensationOutcome {
    let record_cleared = match uploads.delete(&upload.id()).await {
        Ok(_) => true,
        Err(err) => {
            error!(
                upload_id = %upload.id(),
                assignment_id = %upload.assignment_id(),
                error = %err,
                "failed to delete orphaned upload record"
            );
            false
        }
    };

    let object_cleared = match storage.delete_object(upload.object_key()).await {
        Ok(()) => true,
        Err(err) => {
            error!(
                upload_id = %upload.id(),
                object_key = %upload.object_key(),
                error = %err,
                "failed to delete orphaned upload object"
            );
            false
        }
    };

    CompensationOutcome {
        record_cleared,
        object_cleared,
    }
}

/// Coordinates the request, confirm and download steps.
#[derive(Clone)]
pub struct UploadSagaService {
    chain: OwnershipChain,
    assignments: Arc<dyn AssignmentRepository>,
    uploads: Arc<dyn UploadRepository>,
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn Clock>,
    settings: UploadSettings,
}

impl UploadSagaService {
    pub fn new(
        chain: OwnershipChain,
        assignments: Arc<dyn AssignmentRepository>,
        uploads: Arc<dyn UploadRepository>,
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            chain,
            assignments,
            uploads,
            storage,
            clock,
            settings,
        }
    }

    async fn link_upload(
        &self,
        mut assignment: Assignment,
        upload: &Upload,
    ) -> Result<Assignment, Error> {
        let superseded = assignment.upload_id().filter(|previous| *previous != upload.id());
        assignment.attach_upload(upload.id(), self.clock.utc());

        let failure = match self.assignments.update(&assignment).await {
            Ok(true) => None,
            Ok(false) => Some("assignment no longer exists".to_owned()),
            Err(err) => Some(err.to_string()),
        };
        if let Some(reason) = failure {
            debug!(assignment_id = %assignment.id(), error = %reason, "assignment update failed");
            let outcome =
                compensate_orphaned_upload(self.uploads.as_ref(), self.storage.as_ref(), upload)
                    .await;
            info!(
                upload_id = %upload.id(),
                record_cleared = outcome.record_cleared,
                object_cleared = outcome.object_cleared,
                "compensated orphaned upload"
            );
            return Err(Error::confirmation_failed(
                "upload could not be linked to the assignment",
            ));
        }

        if let Some(previous) = superseded {
            self.retire_upload(&previous).await;
        }
        Ok(assignment)
    }

    /// Remove the upload a re-submission replaced. Nothing references it any
    /// more, so failures are logged and never returned.
    async fn retire_upload(&self, upload_id: &UploadId) {
        let upload = match self.uploads.find_by_id(upload_id).await {
            Ok(Some(upload)) => upload,
            Ok(None) => return,
            Err(err) => {
                error!(upload_id = %upload_id, error = %err, "failed to load superseded upload");
                return;
            }
        };
        let outcome =
            compensate_orphaned_upload(self.uploads.as_ref(), self.storage.as_ref(), &upload)
                .await;
        info!(
            upload_id = %upload_id,
            record_cleared = outcome.record_cleared,
            object_cleared = outcome.object_cleared,
            "retired superseded upload"
        );
    }
}

fn parse_content_type(raw: &str) -> Result<VideoContentType, Error> {
    VideoContentType::parse(raw).map_err(|err| Error::invalid_request(err.to_string()))
}

#[async_trait]
impl VideoUpload for UploadSagaService {
    async fn request_upload_url(
        &self,
        request: RequestUploadUrlRequest,
    ) -> Result<UploadTicket, Error> {
        let content_type = parse_content_type(&request.content_type)?;
        let access = self
            .chain
            .authorize_assignment_access_by_client(&request.client_id, &request.assignment_id)
            .await?;

        let status = access.assignment.status();
        if !status.permits_upload() {
            return Err(Error::upload_not_allowed(format!(
                "assignment {} is {status} and awaiting review",
                request.assignment_id
            )));
        }

        let object_key =
            ObjectKey::issue(&request.client_id, &request.assignment_id, &content_type);
        let PresignedUrl { url, expires_in } = self
            .storage
            .presign_put(&object_key, &content_type, self.settings.upload_url_ttl)
            .await?;

        Ok(UploadTicket {
            url,
            object_key,
            expires_in,
        })
    }

    async fn confirm_upload(&self, request: ConfirmUploadRequest) -> Result<Assignment, Error> {
        let ConfirmUploadRequest {
            client_id,
            assignment_id,
            object_key,
            file_name,
            size_bytes,
            content_type,
        } = request;
        let content_type = parse_content_type(&content_type)?;
        let object_key =
            ObjectKey::parse(&object_key).map_err(|err| Error::invalid_request(err.to_string()))?;

        let access = self
            .chain
            .authorize_assignment_access_by_client(&client_id, &assignment_id)
            .await?;

        let upload = Upload::new(UploadDraft {
            id: UploadId::random(),
            assignment_id,
            client_id,
            trainer_id: access.workout.trainer_id(),
            object_key,
            file_name,
            content_type,
            size_bytes,
            uploaded_at: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        if let Err(err) = self.uploads.insert(&upload).await {
            debug!(assignment_id = %assignment_id, error = %err, "upload insert failed");
            return Err(Error::confirmation_failed("upload could not be recorded"));
        }

        self.link_upload(access.assignment, &upload).await
    }

    async fn download_url(&self, request: DownloadUrlRequest) -> Result<PresignedUrl, Error> {
        let access = self
            .chain
            .authorize_assignment_access(&request.viewer, &request.assignment_id)
            .await?;

        let Some(upload_id) = access.assignment.upload_id() else {
            return Err(Error::upload_missing(format!(
                "assignment {} has no uploaded video",
                request.assignment_id
            )));
        };
        let Some(upload) = self.uploads.find_by_id(&upload_id).await? else {
            error!(
                assignment_id = %request.assignment_id,
                upload_id = %upload_id,
                "assignment references an upload that does not exist"
            );
            return Err(Error::data_consistency_fault(format!(
                "assignment {} references missing upload {upload_id}",
                request.assignment_id
            )));
        };

        Ok(self
            .storage
            .presign_get(upload.object_key(), self.settings.download_url_ttl)
            .await?)
    }
}

#[cfg(test)]
#[path = "upload_saga_tests.rs"]
mod tests;
