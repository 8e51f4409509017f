//! Driving port for trainer-side plan management.

use async_trait::async_trait;

use crate::domain::{CascadeReport, Error, PlanDetails, PlanId, TrainingPlan, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlanRequest {
    pub trainer_id: UserId,
    pub client_id: UserId,
    pub details: PlanDetails,
}

/// Leaf update of a plan.
///
/// `client_id` may repeat the current client; any other value is rejected
/// because plans never move between clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlanRequest {
    pub trainer_id: UserId,
    pub plan_id: PlanId,
    pub client_id: Option<UserId>,
    pub details: PlanDetails,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingPlanManagement: Send + Sync {
    /// Create a plan for a client the trainer manages.
    ///
    /// An active plan deactivates the pair's other plans. That step runs
    /// after the plan is stored; if it fails the plan is still returned and
    /// the failure is logged.
    async fn create_plan(&self, request: CreatePlanRequest) -> Result<TrainingPlan, Error>;

    async fn get_plan(&self, trainer_id: UserId, plan_id: PlanId) -> Result<TrainingPlan, Error>;

    /// Plans for one managed client, newest first.
    async fn list_plans_for_client(
        &self,
        trainer_id: UserId,
        client_id: UserId,
    ) -> Result<Vec<TrainingPlan>, Error>;

    async fn update_plan(&self, request: UpdatePlanRequest) -> Result<TrainingPlan, Error>;

    /// Delete the plan and sweep its workouts, assignments and uploads.
    async fn delete_plan(&self, trainer_id: UserId, plan_id: PlanId)
    -> Result<CascadeReport, Error>;
}
