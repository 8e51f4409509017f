//! Trainer-side workout service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::authorization::OwnershipChain;
use super::cascade::{CascadeReport, CascadeSweeper};
use super::ports::{
    CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutManagement, WorkoutRepository,
};
use super::{Error, PlanId, UserId, Workout, WorkoutId};

#[derive(Clone)]
pub struct WorkoutService {
    workouts: Arc<dyn WorkoutRepository>,
    chain: OwnershipChain,
    sweeper: CascadeSweeper,
    clock: Arc<dyn Clock>,
}

impl WorkoutService {
    pub fn new(
        workouts: Arc<dyn WorkoutRepository>,
        chain: OwnershipChain,
        sweeper: CascadeSweeper,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workouts,
            chain,
            sweeper,
            clock,
        }
    }
}

#[async_trait]
impl WorkoutManagement for WorkoutService {
    async fn create_workout(&self, request: CreateWorkoutRequest) -> Result<Workout, Error> {
        let plan = self
            .chain
            .authorize_plan_access(&request.trainer_id, &request.plan_id)
            .await?;
        let workout = Workout::for_plan(&plan, request.details, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.workouts.insert(&workout).await?;
        Ok(workout)
    }

    async fn get_workout(
        &self,
        trainer_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<Workout, Error> {
        self.chain
            .authorize_workout_access(&trainer_id, &workout_id)
            .await
    }

    async fn list_workouts_for_plan(
        &self,
        trainer_id: UserId,
        plan_id: PlanId,
    ) -> Result<Vec<Workout>, Error> {
        self.chain.authorize_plan_access(&trainer_id, &plan_id).await?;
        Ok(self.workouts.list_for_plan(&plan_id).await?)
    }

    async fn update_workout(&self, request: UpdateWorkoutRequest) -> Result<Workout, Error> {
        let workout = self
            .chain
            .authorize_workout_access(&request.trainer_id, &request.workout_id)
            .await?;
        if request
            .plan_id
            .is_some_and(|plan_id| plan_id != workout.plan_id())
        {
            return Err(
                Error::invalid_request("a workout cannot be moved to another plan")
                    .with_reason("parent_mismatch"),
            );
        }

        let revised = workout
            .revise(request.details, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !self.workouts.update(&revised).await? {
            return Err(Error::not_found(format!("workout {} not found", request.workout_id)));
        }
        Ok(revised)
    }

    async fn delete_workout(
        &self,
        trainer_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<CascadeReport, Error> {
        self.chain
            .authorize_workout_access(&trainer_id, &workout_id)
            .await?;
        let inventory = self.sweeper.inventory_workout(&workout_id).await?;

        if !self.workouts.delete_owned(&workout_id, &trainer_id).await? {
            return Err(Error::not_found(format!("workout {workout_id} not found")));
        }
        Ok(self
            .sweeper
            .sweep(&format!("workout {workout_id}"), inventory)
            .await)
    }
}
