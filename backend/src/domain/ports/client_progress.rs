//! Driving ports for the client side: reading the program and reporting
//! progress on it.

use async_trait::async_trait;

use crate::domain::{
    Assignment, AssignmentId, AssignmentStatus, Error, PerformanceLog, PlanId, TrainingPlan,
    UserId, Workout, WorkoutId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatusRequest {
    pub client_id: UserId,
    pub assignment_id: AssignmentId,
    /// Only `completed` is accepted from a client.
    pub status: AssignmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPerformanceRequest {
    pub client_id: UserId,
    pub assignment_id: AssignmentId,
    pub log: PerformanceLog,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientProgress: Send + Sync {
    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Assignment, Error>;

    /// Store achieved metrics. An `assigned` assignment becomes `completed`;
    /// other states are left as they are.
    async fn log_performance(&self, request: LogPerformanceRequest) -> Result<Assignment, Error>;
}

/// Read-only view of the program a client has been given.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientView: Send + Sync {
    /// Plans the client's current trainer created for them, newest first.
    /// Empty when the client has no trainer.
    async fn list_my_plans(&self, client_id: UserId) -> Result<Vec<TrainingPlan>, Error>;

    async fn list_workouts(
        &self,
        client_id: UserId,
        plan_id: PlanId,
    ) -> Result<Vec<Workout>, Error>;

    async fn list_assignments(
        &self,
        client_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<Vec<Assignment>, Error>;

    async fn get_assignment(
        &self,
        client_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<Assignment, Error>;
}
