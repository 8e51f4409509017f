//! Driving port for trainer-side assignment management and feedback.

use async_trait::async_trait;

use crate::domain::{
    Assignment, AssignmentId, AssignmentPlanning, AssignmentStatus, CascadeReport, Error, UserId,
    WorkoutId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignExerciseRequest {
    pub trainer_id: UserId,
    pub workout_id: WorkoutId,
    pub planning: AssignmentPlanning,
}

/// Leaf update of an assignment. A `workout_id` other than the current one
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAssignmentRequest {
    pub trainer_id: UserId,
    pub assignment_id: AssignmentId,
    pub workout_id: Option<WorkoutId>,
    pub planning: AssignmentPlanning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedbackRequest {
    pub trainer_id: UserId,
    pub assignment_id: AssignmentId,
    pub feedback: String,
    /// `reviewed` or `assigned`; `None` records the text only.
    pub status: Option<AssignmentStatus>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentManagement: Send + Sync {
    /// Place an owned exercise into an owned workout.
    async fn assign_exercise(&self, request: AssignExerciseRequest) -> Result<Assignment, Error>;

    async fn get_assignment(
        &self,
        trainer_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<Assignment, Error>;

    /// Assignments of an owned workout ordered by sequence.
    async fn list_assignments_for_workout(
        &self,
        trainer_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<Vec<Assignment>, Error>;

    /// Replace prescription, notes, order or exercise.
    ///
    /// A new exercise must also belong to the trainer.
    async fn update_assignment(&self, request: UpdateAssignmentRequest)
    -> Result<Assignment, Error>;

    /// Delete the assignment and sweep its uploads.
    async fn delete_assignment(
        &self,
        trainer_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<CascadeReport, Error>;

    async fn submit_feedback(&self, request: SubmitFeedbackRequest) -> Result<Assignment, Error>;
}
