//! Ownership authorization chain.
//!
//! Every check re-reads the target and walks at most one parent reference.
//! Workouts carry denormalised owner ids, so plan, workout and assignment
//! checks all finish without loading a plan. Nothing is cached between calls.
//!
//! Outcomes:
//! - target absent: `not_found`
//! - target present but owned by someone else: `forbidden`
//! - assignment present but its workout missing: `data_consistency_fault`

use std::sync::Arc;

use tracing::error;

use super::ports::{AssignmentRepository, TrainingPlanRepository, WorkoutRepository};
use super::{Assignment, AssignmentId, Error, PlanId, TrainingPlan, UserId, Workout, WorkoutId};

/// Caller identity as asserted by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Trainer(UserId),
    Client(UserId),
}

impl Actor {
    pub fn id(&self) -> UserId {
        match self {
            Self::Trainer(id) | Self::Client(id) => *id,
        }
    }
}

/// An assignment together with the workout it was authorized through.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedAssignment {
    pub assignment: Assignment,
    pub workout: Workout,
}

/// Resolves whether an actor may act on a plan, workout or assignment.
#[derive(Clone)]
pub struct OwnershipChain {
    plans: Arc<dyn TrainingPlanRepository>,
    workouts: Arc<dyn WorkoutRepository>,
    assignments: Arc<dyn AssignmentRepository>,
}

impl OwnershipChain {
    pub fn new(
        plans: Arc<dyn TrainingPlanRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        assignments: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            plans,
            workouts,
            assignments,
        }
    }

    async fn load_plan(&self, plan_id: &PlanId) -> Result<TrainingPlan, Error> {
        self.plans
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("training plan {plan_id} not found")))
    }

    async fn load_workout(&self, workout_id: &WorkoutId) -> Result<Workout, Error> {
        self.workouts
            .find_by_id(workout_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("workout {workout_id} not found")))
    }

    async fn load_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<AuthorizedAssignment, Error> {
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("assignment {assignment_id} not found")))?;

        let workout_id = assignment.workout_id();
        let Some(workout) = self.workouts.find_by_id(&workout_id).await? else {
            error!(
                assignment_id = %assignment_id,
                workout_id = %workout_id,
                "assignment references a workout that does not exist"
            );
            return Err(Error::data_consistency_fault(format!(
                "assignment {assignment_id} references missing workout {workout_id}"
            )));
        };

        Ok(AuthorizedAssignment {
            assignment,
            workout,
        })
    }

    /// The plan, when `trainer_id` owns it.
    pub async fn authorize_plan_access(
        &self,
        trainer_id: &UserId,
        plan_id: &PlanId,
    ) -> Result<TrainingPlan, Error> {
        let plan = self.load_plan(plan_id).await?;
        if plan.trainer_id() != *trainer_id {
            return Err(Error::forbidden(format!(
                "training plan {plan_id} belongs to another trainer"
            )));
        }
        Ok(plan)
    }

    /// The plan, when it was assigned to `client_id`.
    pub async fn authorize_plan_access_by_client(
        &self,
        client_id: &UserId,
        plan_id: &PlanId,
    ) -> Result<TrainingPlan, Error> {
        let plan = self.load_plan(plan_id).await?;
        if plan.client_id() != *client_id {
            return Err(Error::forbidden(format!(
                "training plan {plan_id} is not assigned to this client"
            )));
        }
        Ok(plan)
    }

    /// The workout, when its denormalised trainer is `trainer_id`.
    pub async fn authorize_workout_access(
        &self,
        trainer_id: &UserId,
        workout_id: &WorkoutId,
    ) -> Result<Workout, Error> {
        let workout = self.load_workout(workout_id).await?;
        if workout.trainer_id() != *trainer_id {
            return Err(Error::forbidden(format!(
                "workout {workout_id} belongs to another trainer"
            )));
        }
        Ok(workout)
    }

    /// The workout, when its denormalised client is `client_id`.
    pub async fn authorize_workout_access_by_client(
        &self,
        client_id: &UserId,
        workout_id: &WorkoutId,
    ) -> Result<Workout, Error> {
        let workout = self.load_workout(workout_id).await?;
        if workout.client_id() != *client_id {
            return Err(Error::forbidden(format!(
                "workout {workout_id} is not assigned to this client"
            )));
        }
        Ok(workout)
    }

    /// The assignment and its workout, when the workout's trainer matches.
    pub async fn authorize_assignment_access_by_trainer(
        &self,
        trainer_id: &UserId,
        assignment_id: &AssignmentId,
    ) -> Result<AuthorizedAssignment, Error> {
        let access = self.load_assignment(assignment_id).await?;
        if access.workout.trainer_id() != *trainer_id {
            return Err(Error::forbidden(format!(
                "assignment {assignment_id} belongs to another trainer"
            )));
        }
        Ok(access)
    }

    /// The assignment and its workout, when the workout's client matches.
    pub async fn authorize_assignment_access_by_client(
        &self,
        client_id: &UserId,
        assignment_id: &AssignmentId,
    ) -> Result<AuthorizedAssignment, Error> {
        let access = self.load_assignment(assignment_id).await?;
        if access.workout.client_id() != *client_id {
            return Err(Error::forbidden(format!(
                "assignment {assignment_id} does not belong to this client"
            )));
        }
        Ok(access)
    }

    /// Dispatch on the actor's role.
    pub async fn authorize_assignment_access(
        &self,
        actor: &Actor,
        assignment_id: &AssignmentId,
    ) -> Result<AuthorizedAssignment, Error> {
        match actor {
            Actor::Trainer(trainer_id) => {
                self.authorize_assignment_access_by_trainer(trainer_id, assignment_id)
                    .await
            }
            Actor::Client(client_id) => {
                self.authorize_assignment_access_by_client(client_id, assignment_id)
                    .await
            }
        }
    }
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod tests;
