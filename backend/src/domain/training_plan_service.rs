//! Trainer-side training plan service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use super::authorization::OwnershipChain;
use super::cascade::{CascadeReport, CascadeSweeper};
use super::ports::{
    CreatePlanRequest, TrainingPlanManagement, TrainingPlanRepository, UpdatePlanRequest,
    UserRepository,
};
use super::{Error, PlanId, TrainingPlan, TrainingPlanDraft, UserId, UserRole};

#[derive(Clone)]
pub struct TrainingPlanService {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn TrainingPlanRepository>,
    chain: OwnershipChain,
    sweeper: CascadeSweeper,
    clock: Arc<dyn Clock>,
}

impl TrainingPlanService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        plans: Arc<dyn TrainingPlanRepository>,
        chain: OwnershipChain,
        sweeper: CascadeSweeper,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            plans,
            chain,
            sweeper,
            clock,
        }
    }

    /// Fail unless `client_id` is a client account managed by `trainer_id`.
    async fn ensure_managed_client(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), Error> {
        let client = self
            .users
            .find_by_id(client_id)
            .await?
            .filter(|user| user.role() == UserRole::Client)
            .ok_or_else(|| Error::not_found(format!("client {client_id} not found")))?;
        if !client.is_managed_by(trainer_id) {
            return Err(
                Error::forbidden(format!("client {client_id} is not managed by this trainer"))
                    .with_reason("client_not_managed"),
            );
        }
        Ok(())
    }

    /// Deactivate the pair's other plans once `plan` is stored as active.
    ///
    /// The plan is already stored, so a failure here is logged rather than
    /// returned.
    async fn enforce_single_active(&self, plan: &TrainingPlan) {
        if !plan.is_active() {
            return;
        }
        match self
            .plans
            .deactivate_others(&plan.trainer_id(), &plan.client_id(), &plan.id())
            .await
        {
            Ok(changed) => debug!(plan_id = %plan.id(), deactivated = changed, "plan activated"),
            Err(err) => warn!(
                plan_id = %plan.id(),
                error = %err,
                "plan stored but sibling plans were not deactivated"
            ),
        }
    }
}

#[async_trait]
impl TrainingPlanManagement for TrainingPlanService {
    async fn create_plan(&self, request: CreatePlanRequest) -> Result<TrainingPlan, Error> {
        self.ensure_managed_client(&request.trainer_id, &request.client_id)
            .await?;

        let now = self.clock.utc();
        let plan = TrainingPlan::new(TrainingPlanDraft {
            id: PlanId::random(),
            trainer_id: request.trainer_id,
            client_id: request.client_id,
            details: request.details,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.plans.insert(&plan).await?;
        self.enforce_single_active(&plan).await;
        Ok(plan)
    }

    async fn get_plan(&self, trainer_id: UserId, plan_id: PlanId) -> Result<TrainingPlan, Error> {
        self.chain.authorize_plan_access(&trainer_id, &plan_id).await
    }

    async fn list_plans_for_client(
        &self,
        trainer_id: UserId,
        client_id: UserId,
    ) -> Result<Vec<TrainingPlan>, Error> {
        self.ensure_managed_client(&trainer_id, &client_id).await?;
        Ok(self.plans.list_for_pair(&trainer_id, &client_id).await?)
    }

    async fn update_plan(&self, request: UpdatePlanRequest) -> Result<TrainingPlan, Error> {
        let plan = self
            .chain
            .authorize_plan_access(&request.trainer_id, &request.plan_id)
            .await?;
        if request
            .client_id
            .is_some_and(|client_id| client_id != plan.client_id())
        {
            return Err(
                Error::invalid_request("a plan cannot be moved to another client")
                    .with_reason("parent_mismatch"),
            );
        }

        let revised = plan
            .revise(request.details, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !self.plans.update(&revised).await? {
            return Err(Error::not_found(format!("plan {} not found", request.plan_id)));
        }
        self.enforce_single_active(&revised).await;
        Ok(revised)
    }

    async fn delete_plan(
        &self,
        trainer_id: UserId,
        plan_id: PlanId,
    ) -> Result<CascadeReport, Error> {
        self.chain.authorize_plan_access(&trainer_id, &plan_id).await?;
        let inventory = self.sweeper.inventory_plan(&plan_id).await?;

        if !self.plans.delete_owned(&plan_id, &trainer_id).await? {
            return Err(Error::not_found(format!("training plan {plan_id} not found")));
        }
        Ok(self
            .sweeper
            .sweep(&format!("plan {plan_id}"), inventory)
            .await)
    }
}

#[cfg(test)]
#[path = "training_plan_service_tests.rs"]
mod tests;
