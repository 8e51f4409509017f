//! Port for upload metadata records.
use async_trait::async_trait;

use crate::domain::{AssignmentId, Upload, UploadId};

use super::{define_port_error, persistence_error_into_domain};

define_port_error! {
    /// Errors raised by upload repository adapters.
    pub enum UploadRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "upload repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "upload repository query failed: {message}",
    }
}

persistence_error_into_domain!(UploadRepositoryError => "upload repository");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadRepository: Send + Sync {
    async fn find_by_id(&self, id: &UploadId) -> Result<Option<Upload>, UploadRepositoryError>;

    /// Every upload recorded for the assignment, including superseded ones.
    async fn list_for_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<Upload>, UploadRepositoryError>;

    async fn insert(&self, upload: &Upload) -> Result<(), UploadRepositoryError>;

    async fn delete(&self, id: &UploadId) -> Result<bool, UploadRepositoryError>;
}

/// Fixture implementation without uploads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUploadRepository;

#[async_trait]
impl UploadRepository for FixtureUploadRepository {
    async fn find_by_id(&self, _id: &UploadId) -> Result<Option<Upload>, UploadRepositoryError> {
        Ok(None)
    }

    async fn list_for_assignment(
        &self,
        _assignment_id: &AssignmentId,
    ) -> Result<Vec<Upload>, UploadRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _upload: &Upload) -> Result<(), UploadRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: &UploadId) -> Result<bool, UploadRepositoryError> {
        Ok(false)
    }
}
