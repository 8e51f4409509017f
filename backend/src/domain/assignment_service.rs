//! Trainer-side assignment service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::authorization::OwnershipChain;
use super::cascade::{CascadeReport, CascadeSweeper};
use super::ports::{
    AssignExerciseRequest, AssignmentManagement, AssignmentRepository, ExerciseRepository,
    SubmitFeedbackRequest, UpdateAssignmentRequest,
};
use super::{Assignment, AssignmentId, Error, ExerciseId, UserId, WorkoutId};

#[derive(Clone)]
pub struct AssignmentService {
    exercises: Arc<dyn ExerciseRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    chain: OwnershipChain,
    sweeper: CascadeSweeper,
    clock: Arc<dyn Clock>,
}

impl AssignmentService {
    pub fn new(
        exercises: Arc<dyn ExerciseRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        chain: OwnershipChain,
        sweeper: CascadeSweeper,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            exercises,
            assignments,
            chain,
            sweeper,
            clock,
        }
    }

    async fn ensure_owned_exercise(
        &self,
        trainer_id: &UserId,
        exercise_id: &ExerciseId,
    ) -> Result<(), Error> {
        let exercise = self
            .exercises
            .find_by_id(exercise_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("exercise {exercise_id} not found")))?;
        if !exercise.is_owned_by(trainer_id) {
            return Err(Error::forbidden(format!(
                "exercise {exercise_id} belongs to another trainer"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AssignmentManagement for AssignmentService {
    async fn assign_exercise(&self, request: AssignExerciseRequest) -> Result<Assignment, Error> {
        let workout = self
            .chain
            .authorize_workout_access(&request.trainer_id, &request.workout_id)
            .await?;
        self.ensure_owned_exercise(&request.trainer_id, &request.planning.exercise_id)
            .await?;

        let assignment = Assignment::assign(&workout, request.planning, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.assignments.insert(&assignment).await?;
        Ok(assignment)
    }

    async fn get_assignment(
        &self,
        trainer_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<Assignment, Error> {
        let access = self
            .chain
            .authorize_assignment_access_by_trainer(&trainer_id, &assignment_id)
            .await?;
        Ok(access.assignment)
    }

    async fn list_assignments_for_workout(
        &self,
        trainer_id: UserId,
        workout_id: WorkoutId,
    ) -> Result<Vec<Assignment>, Error> {
        self.chain
            .authorize_workout_access(&trainer_id, &workout_id)
            .await?;
        Ok(self.assignments.list_for_workout(&workout_id).await?)
    }

    async fn update_assignment(
        &self,
        request: UpdateAssignmentRequest,
    ) -> Result<Assignment, Error> {
        let access = self
            .chain
            .authorize_assignment_access_by_trainer(&request.trainer_id, &request.assignment_id)
            .await?;
        let mut assignment = access.assignment;
        if request
            .workout_id
            .is_some_and(|workout_id| workout_id != assignment.workout_id())
        {
            return Err(
                Error::invalid_request("an assignment cannot be moved to another workout")
                    .with_reason("parent_mismatch"),
            );
        }
        if request.planning.exercise_id != assignment.exercise_id() {
            self.ensure_owned_exercise(&request.trainer_id, &request.planning.exercise_id)
                .await?;
        }

        assignment
            .replan(request.planning, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !self.assignments.update(&assignment).await? {
            return Err(Error::not_found(format!("assignment {} not found", request.assignment_id)));
        }
        Ok(assignment)
    }

    async fn delete_assignment(
        &self,
        trainer_id: UserId,
        assignment_id: AssignmentId,
    ) -> Result<CascadeReport, Error> {
        self.chain
            .authorize_assignment_access_by_trainer(&trainer_id, &assignment_id)
            .await?;
        let inventory = self.sweeper.inventory_assignment(&assignment_id).await?;

        if !self
            .assignments
            .delete_owned(&assignment_id, &trainer_id)
            .await?
        {
            return Err(Error::not_found(format!(
                "assignment {assignment_id} not found"
            )));
        }
        Ok(self
            .sweeper
            .sweep(&format!("assignment {assignment_id}"), inventory)
            .await)
    }

    async fn submit_feedback(&self, request: SubmitFeedbackRequest) -> Result<Assignment, Error> {
        let access = self
            .chain
            .authorize_assignment_access_by_trainer(&request.trainer_id, &request.assignment_id)
            .await?;
        let mut assignment = access.assignment;

        assignment
            .record_feedback(request.feedback, request.status, self.clock.utc())
            .map_err(|err| Error::invalid_transition(err.to_string()))?;
        if !self.assignments.update(&assignment).await? {
            return Err(Error::not_found(format!("assignment {} not found", request.assignment_id)));
        }
        Ok(assignment)
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
