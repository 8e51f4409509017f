//! Port for training plan persistence.
use async_trait::async_trait;

use crate::domain::{PlanId, TrainingPlan, UserId};

use super::{define_port_error, persistence_error_into_domain};

define_port_error! {
    /// Errors raised by training plan repository adapters.
    pub enum TrainingPlanRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "training plan repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "training plan repository query failed: {message}",
    }
}

persistence_error_into_domain!(TrainingPlanRepositoryError => "training plan repository");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingPlanRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &PlanId,
    ) -> Result<Option<TrainingPlan>, TrainingPlanRepositoryError>;

    /// Plans for one (trainer, client) pair, newest first.
    async fn list_for_pair(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<Vec<TrainingPlan>, TrainingPlanRepositoryError>;

    async fn insert(&self, plan: &TrainingPlan) -> Result<(), TrainingPlanRepositoryError>;

    /// Overwrite the stored row with the same id.
    ///
    /// Returns `false` when the row no longer exists; an update never
    /// recreates a deleted row.
    async fn update(&self, plan: &TrainingPlan) -> Result<bool, TrainingPlanRepositoryError>;

    /// Clear the active flag on every plan of the pair except `keep`.
    ///
    /// Returns the number of plans changed.
    async fn deactivate_others(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
        keep: &PlanId,
    ) -> Result<u64, TrainingPlanRepositoryError>;

    /// Delete the plan only when it belongs to `trainer_id`.
    async fn delete_owned(
        &self,
        id: &PlanId,
        trainer_id: &UserId,
    ) -> Result<bool, TrainingPlanRepositoryError>;
}

/// Fixture implementation without plans.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTrainingPlanRepository;

#[async_trait]
impl TrainingPlanRepository for FixtureTrainingPlanRepository {
    async fn find_by_id(
        &self,
        _id: &PlanId,
    ) -> Result<Option<TrainingPlan>, TrainingPlanRepositoryError> {
        Ok(None)
    }

    async fn list_for_pair(
        &self,
        _trainer_id: &UserId,
        _client_id: &UserId,
    ) -> Result<Vec<TrainingPlan>, TrainingPlanRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _plan: &TrainingPlan) -> Result<(), TrainingPlanRepositoryError> {
        Ok(())
    }

    async fn update(&self, _plan: &TrainingPlan) -> Result<bool, TrainingPlanRepositoryError> {
        Ok(false)
    }

    async fn deactivate_others(
        &self,
        _trainer_id: &UserId,
        _client_id: &UserId,
        _keep: &PlanId,
    ) -> Result<u64, TrainingPlanRepositoryError> {
        Ok(0)
    }

    async fn delete_owned(
        &self,
        _id: &PlanId,
        _trainer_id: &UserId,
    ) -> Result<bool, TrainingPlanRepositoryError> {
        Ok(false)
    }
}
