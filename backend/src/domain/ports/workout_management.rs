//! Driving port for trainer-side workout management.

use async_trait::async_trait;

use crate::domain::{CascadeReport, Error, PlanId, UserId, Workout, WorkoutDetails, WorkoutId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkoutRequest {
    pub trainer_id: UserId,
    pub plan_id: PlanId,
    pub details: WorkoutDetails,
}

/// Leaf update of a workout. A `plan_id` other than the current one is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateWorkoutRequest {
    pub trainer_id: UserId,
    pub workout_id: WorkoutId,
    pub plan_id: Option<PlanId>,
    pub details: WorkoutDetails,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkoutManagement: Send + Sync {
    /// Create a workout under an owned plan, copying its trainer and client.
    async fn create_workout(&self, request: CreateWorkoutRequest) -> Result<Workout, Error>;

    async fn get_workout(&self, trainer_id: UserId, workout_id: WorkoutId)
    -> Result<Workout, Error>;

    /// Workouts of an owned plan ordered by sequence, then day of week.
    async fn list_workouts_for_plan(
        &self,
        trainer_id: UserId,
        plan_id: PlanId,
    ) -> Result<Vec<Workout>, Error>;

    async fn update_workout(&self, request: UpdateWorkoutRequest) -> Result<Workout, Error>;

    /// Delete the workout and sweep its assignments and uploads.
    async fn delete_workout(
        &self,
        trainer_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<CascadeReport, Error>;
}
