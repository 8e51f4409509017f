//! Driving port for a trainer's exercise library.

use async_trait::async_trait;

use crate::domain::{Error, Exercise, ExerciseDetails, ExerciseId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateExerciseRequest {
    pub trainer_id: UserId,
    pub details: ExerciseDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateExerciseRequest {
    pub trainer_id: UserId,
    pub exercise_id: ExerciseId,
    pub details: ExerciseDetails,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExerciseManagement: Send + Sync {
    async fn create_exercise(&self, request: CreateExerciseRequest) -> Result<Exercise, Error>;

    /// Fetch an exercise the trainer owns.
    async fn get_exercise(
        &self,
        trainer_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<Exercise, Error>;

    /// The trainer's library, newest first.
    async fn list_exercises(&self, trainer_id: UserId) -> Result<Vec<Exercise>, Error>;

    async fn update_exercise(&self, request: UpdateExerciseRequest) -> Result<Exercise, Error>;

    /// Delete with an owner-gated filter.
    ///
    /// Assignments keep their reference to the removed exercise.
    async fn delete_exercise(&self, trainer_id: UserId, exercise_id: ExerciseId)
    -> Result<(), Error>;
}
