//! PostgreSQL-backed `UploadRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UploadRepository, UploadRepositoryError};
use crate::domain::{
    AssignmentId, ObjectKey, Upload, UploadDraft, UploadId, UserId, VideoContentType,
};

use super::error_mapping::{invalid_row, map_diesel_error, map_pool_error};
use super::models::{NewUploadRow, UploadRow};
use super::pool::{DbPool, PoolError};
use super::schema::uploads;

/// Diesel-backed implementation of the `UploadRepository` port.
#[derive(Clone)]
pub struct DieselUploadRepository {
    pool: DbPool,
}

impl DieselUploadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UploadRepositoryError {
    map_pool_error(error, UploadRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UploadRepositoryError {
    map_diesel_error(
        error,
        UploadRepositoryError::query,
        UploadRepositoryError::connection,
    )
}

fn row_to_upload(row: UploadRow) -> Result<Upload, UploadRepositoryError> {
    let id = row.id;
    let invalid =
        |reason: String| UploadRepositoryError::query(invalid_row("uploads", id, reason));
    let object_key = ObjectKey::parse(&row.object_key).map_err(|err| invalid(err.to_string()))?;
    let content_type =
        VideoContentType::parse(&row.content_type).map_err(|err| invalid(err.to_string()))?;
    let size_bytes = u64::try_from(row.size_bytes)
        .map_err(|_| invalid(format!("size_bytes {} is negative", row.size_bytes)))?;

    Upload::new(UploadDraft {
        id: UploadId::from_uuid(id),
        assignment_id: AssignmentId::from_uuid(row.assignment_id),
        client_id: UserId::from_uuid(row.client_id),
        trainer_id: UserId::from_uuid(row.trainer_id),
        object_key,
        file_name: row.file_name,
        content_type,
        size_bytes,
        uploaded_at: row.uploaded_at,
    })
    .map_err(|err| invalid(err.to_string()))
}

#[async_trait]
impl UploadRepository for DieselUploadRepository {
    async fn find_by_id(&self, id: &UploadId) -> Result<Option<Upload>, UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        uploads::table
            .filter(uploads::id.eq(id.as_uuid()))
            .select(UploadRow::as_select())
            .first::<UploadRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_upload)
            .transpose()
    }

    async fn list_for_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<Upload>, UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        uploads::table
            .filter(uploads::assignment_id.eq(assignment_id.as_uuid()))
            .order(uploads::uploaded_at.asc())
            .select(UploadRow::as_select())
            .load::<UploadRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_upload)
            .collect()
    }

    async fn insert(&self, upload: &Upload) -> Result<(), UploadRepositoryError> {
        let size_bytes = i64::try_from(upload.size_bytes()).map_err(|_| {
            UploadRepositoryError::query(format!(
                "size_bytes {} exceeds the column range",
                upload.size_bytes()
            ))
        })?;
        let row = NewUploadRow {
            id: *upload.id().as_uuid(),
            assignment_id: *upload.assignment_id().as_uuid(),
            client_id: *upload.client_id().as_uuid(),
            trainer_id: *upload.trainer_id().as_uuid(),
            object_key: upload.object_key().as_str(),
            file_name: upload.file_name(),
            content_type: upload.content_type().as_str(),
            size_bytes,
            uploaded_at: upload.uploaded_at(),
        };

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(uploads::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn delete(&self, id: &UploadId) -> Result<bool, UploadRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(uploads::table.filter(uploads::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
