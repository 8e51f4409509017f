//! Port for the trainer-owned exercise library.
use async_trait::async_trait;

use crate::domain::{Exercise, ExerciseId, UserId};

use super::{define_port_error, persistence_error_into_domain};

define_port_error! {
    /// Errors raised by exercise repository adapters.
    pub enum ExerciseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "exercise repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "exercise repository query failed: {message}",
    }
}

persistence_error_into_domain!(ExerciseRepositoryError => "exercise repository");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    async fn find_by_id(&self, id: &ExerciseId)
    -> Result<Option<Exercise>, ExerciseRepositoryError>;

    /// Exercises owned by `trainer_id`, newest first.
    async fn list_for_trainer(
        &self,
        trainer_id: &UserId,
    ) -> Result<Vec<Exercise>, ExerciseRepositoryError>;

    async fn insert(&self, exercise: &Exercise) -> Result<(), ExerciseRepositoryError>;

    /// Overwrite the stored row with the same id.
    ///
    /// Returns `false` when the row no longer exists; an update never
    /// recreates a deleted row.
    async fn update(&self, exercise: &Exercise) -> Result<bool, ExerciseRepositoryError>;

    /// Delete the exercise only when it belongs to `trainer_id`.
    ///
    /// Returns `false` when no row matched both conditions.
    async fn delete_owned(
        &self,
        id: &ExerciseId,
        trainer_id: &UserId,
    ) -> Result<bool, ExerciseRepositoryError>;
}

/// Fixture implementation with an empty library.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExerciseRepository;

#[async_trait]
impl ExerciseRepository for FixtureExerciseRepository {
    async fn find_by_id(
        &self,
        _id: &ExerciseId,
    ) -> Result<Option<Exercise>, ExerciseRepositoryError> {
        Ok(None)
    }

    async fn list_for_trainer(
        &self,
        _trainer_id: &UserId,
    ) -> Result<Vec<Exercise>, ExerciseRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _exercise: &Exercise) -> Result<(), ExerciseRepositoryError> {
        Ok(())
    }

    async fn update(&self, _exercise: &Exercise) -> Result<bool, ExerciseRepositoryError> {
        Ok(false)
    }

    async fn delete_owned(
        &self,
        _id: &ExerciseId,
        _trainer_id: &UserId,
    ) -> Result<bool, ExerciseRepositoryError> {
        Ok(false)
    }
}
