//! Port for workout persistence.
use async_trait::async_trait;

use crate::domain::{PlanId, UserId, Workout, WorkoutId};

use super::{define_port_error, persistence_error_into_domain};

define_port_error! {
    /// Errors raised by workout repository adapters.
    pub enum WorkoutRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "workout repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "workout repository query failed: {message}",
    }
}

persistence_error_into_domain!(WorkoutRepositoryError => "workout repository");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    async fn find_by_id(&self, id: &WorkoutId) -> Result<Option<Workout>, WorkoutRepositoryError>;

    /// Workouts of a plan ordered by sequence, then day of week.
    async fn list_for_plan(&self, plan_id: &PlanId)
    -> Result<Vec<Workout>, WorkoutRepositoryError>;

    async fn insert(&self, workout: &Workout) -> Result<(), WorkoutRepositoryError>;

    /// Overwrite the stored row with the same id.
    ///
    /// Returns `false` when the row no longer exists; an update never
    /// recreates a deleted row.
    async fn update(&self, workout: &Workout) -> Result<bool, WorkoutRepositoryError>;

    /// Delete the workout only when its denormalised owner is `trainer_id`.
    async fn delete_owned(
        &self,
        id: &WorkoutId,
        trainer_id: &UserId,
    ) -> Result<bool, WorkoutRepositoryError>;

    /// Unconditional delete used when sweeping descendants.
    async fn delete(&self, id: &WorkoutId) -> Result<bool, WorkoutRepositoryError>;
}

/// Fixture implementation without workouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWorkoutRepository;

#[async_trait]
impl WorkoutRepository for FixtureWorkoutRepository {
    async fn find_by_id(&self, _id: &WorkoutId) -> Result<Option<Workout>, WorkoutRepositoryError> {
        Ok(None)
    }

    async fn list_for_plan(
        &self,
        _plan_id: &PlanId,
    ) -> Result<Vec<Workout>, WorkoutRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _workout: &Workout) -> Result<(), WorkoutRepositoryError> {
        Ok(())
    }

    async fn update(&self, _workout: &Workout) -> Result<bool, WorkoutRepositoryError> {
        Ok(false)
    }

    async fn delete_owned(
        &self,
        _id: &WorkoutId,
        _trainer_id: &UserId,
    ) -> Result<bool, WorkoutRepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _id: &WorkoutId) -> Result<bool, WorkoutRepositoryError> {
        Ok(false)
    }
}
