//! Port for assignment persistence.
use async_trait::async_trait;

use crate::domain::{Assignment, AssignmentId, UserId, WorkoutId};

use super::{define_port_error, persistence_error_into_domain};

define_port_error! {
    /// Errors raised by assignment repository adapters.
    pub enum AssignmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "assignment repository query failed: {message}",
    }
}

persistence_error_into_domain!(AssignmentRepositoryError => "assignment repository");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError>;

    /// Assignments of a workout ordered by sequence.
    async fn list_for_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError>;

    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError>;

    /// Overwrite the stored row with the same id.
    ///
    /// Returns `false` when the row no longer exists; an update never
    /// recreates a deleted row.
    async fn update(&self, assignment: &Assignment) -> Result<bool, AssignmentRepositoryError>;

    /// Delete the assignment only when its workout belongs to `trainer_id`.
    ///
    /// The owner is resolved through the workout inside the same statement.
    async fn delete_owned(
        &self,
        id: &AssignmentId,
        trainer_id: &UserId,
    ) -> Result<bool, AssignmentRepositoryError>;

    /// Unconditional delete used when sweeping descendants.
    async fn delete(&self, id: &AssignmentId) -> Result<bool, AssignmentRepositoryError>;
}

/// Fixture implementation without assignments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssignmentRepository;

#[async_trait]
impl AssignmentRepository for FixtureAssignmentRepository {
    async fn find_by_id(
        &self,
        _id: &AssignmentId,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        Ok(None)
    }

    async fn list_for_workout(
        &self,
        _workout_id: &WorkoutId,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        Ok(())
    }

    async fn update(&self, _assignment: &Assignment) -> Result<bool, AssignmentRepositoryError> {
        Ok(false)
    }

    async fn delete_owned(
        &self,
        _id: &AssignmentId,
        _trainer_id: &UserId,
    ) -> Result<bool, AssignmentRepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _id: &AssignmentId) -> Result<bool, AssignmentRepositoryError> {
        Ok(false)
    }
}
