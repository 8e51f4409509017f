//! Client-facing reads and progress reporting.
//!
//! Every call resolves ownership through the workout of the target entity,
//! so a client only ever sees rows whose denormalised `client_id` is theirs.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::authorization::OwnershipChain;
use super::ports::{
    AssignmentRepository, ClientProgress, ClientView, LogPerformanceRequest,
    TrainingPlanRepository, UpdateStatusRequest, UserRepository, WorkoutRepository,
};
use super::{
    Assignment, AssignmentId, Error, PlanId, TrainingPlan, UserId, UserRole, Workout, WorkoutId,
};

#[derive(Clone)]
pub struct ClientService {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn TrainingPlanRepository>,
    workouts: Arc<dyn WorkoutRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    chain: OwnershipChain,
    clock: Arc<dyn Clock>,
}

impl ClientService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        plans: Arc<dyn TrainingPlanRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let chain = OwnershipChain::new(
            Arc::clone(&plans),
            Arc::clone(&workouts),
            Arc::clone(&assignments),
        );
        Self {
            users,
            plans,
            workouts,
            assignments,
            chain,
            clock,
        }
    }
}

#[async_trait]
impl ClientProgress for ClientService {
    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Assignment, Error> {
        let access = self
            .chain
            .authorize_assignment_access_by_client(&request.client_id, &request.assignment_id)
            .await?;
        let mut assignment = access.assignment;

        assignment
            .client_set_status(request.status, request.notes, self.clock.utc())
            .map_err(|err| Error::invalid_transition(err.to_string()))?;
        if !self.assignments.update(&assignment).await? {
            return Err(Error::not_found(format!("assignment {} not found", request.assignment_id)));
        }
        Ok(assignment)
    }

    async fn log_performance(&self, request: LogPerformanceRequest) -> Result<Assignment, Error> {
        let access = self
            .chain
            .authorize_assignment_access_by_client(&request.client_id, &request.assignment_id)
            .await?;
        let mut assignment = access.assignment;

        assignment
            .log_performance(request.log, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !self.assignments.update(&assignment).await? {
            return Err(Error::not_found(format!("assignment {} not found", request.assignment_id)));
        }
        Ok(assignment)
    }
}

#[async_trait]
impl ClientView for ClientService {
    async fn list_my_plans(&self, client_id: UserId) -> Result<Vec<TrainingPlan>, Error> {
        let client = self
            .users
            .find_by_id(&client_id)
            .await?
            .filter(|user| user.role() == UserRole::Client)
            .ok_or_else(|| Error::not_found(format!("client {client_id} not found")))?;
        let Some(trainer_id) = client.trainer_id() else {
            return Ok(Vec::new());
        };
        Ok(self.plans.list_for_pair(&trainer_id, &client_id).await?)
    }

    async fn list_workouts(
        &self,
        client_id: UserId,
        plan_id: PlanId,
    ) -> Result<Vec<Workout>, Error> {
        self.chain
            .authorize_plan_access_by_client(&client_id, &plan_id)
            .await?;
        Ok(self.workouts.list_for_plan(&plan_id).await?)
    }

    async fn list_assignments(
        &self,
        client_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<Vec<Assignment>, Error> {
        self.chain
            .authorize_workout_access_by_client(&client_id, &workout_id)
            .await?;
        Ok(self.assignments.list_for_workout(&workout_id).await?)
    }

    async fn get_assignment(
        &self,
        client_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<Assignment, Error> {
        let access = self
            .chain
            .authorize_assignment_access_by_client(&client_id, &assignment_id)
            .await?;
        Ok(access.assignment)
    }
}

#[cfg(test)]
#[path = "client_service_tests.rs"]
mod tests;
