//! Exercise library service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::ports::{
    CreateExerciseRequest, ExerciseManagement, ExerciseRepository, UpdateExerciseRequest,
};
use super::{Error, Exercise, ExerciseDraft, ExerciseId, UserId};

#[derive(Clone)]
pub struct ExerciseService {
    exercises: Arc<dyn ExerciseRepository>,
    clock: Arc<dyn Clock>,
}

impl ExerciseService {
    pub fn new(exercises: Arc<dyn ExerciseRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { exercises, clock }
    }

    async fn load_owned(
        &self,
        trainer_id: &UserId,
        exercise_id: &ExerciseId,
    ) -> Result<Exercise, Error> {
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
        Ok(exercise)
    }
}

#[async_trait]
impl ExerciseManagement for ExerciseService {
    async fn create_exercise(&self, request: CreateExerciseRequest) -> Result<Exercise, Error> {
        let now = self.clock.utc();
        let exercise = Exercise::new(ExerciseDraft {
            id: ExerciseId::random(),
            trainer_id: request.trainer_id,
            details: request.details,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.exercises.insert(&exercise).await?;
        Ok(exercise)
    }

    async fn get_exercise(
        &self,
        trainer_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<Exercise, Error> {
        self.load_owned(&trainer_id, &exercise_id).await
    }

    async fn list_exercises(&self, trainer_id: UserId) -> Result<Vec<Exercise>, Error> {
        Ok(self.exercises.list_for_trainer(&trainer_id).await?)
    }

    async fn update_exercise(&self, request: UpdateExerciseRequest) -> Result<Exercise, Error> {
        let current = self
            .load_owned(&request.trainer_id, &request.exercise_id)
            .await?;
        let revised = current
            .revise(request.details, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        if !self.exercises.update(&revised).await? {
            return Err(Error::not_found(format!("exercise {} not found", request.exercise_id)));
        }
        Ok(revised)
    }

    async fn delete_exercise(
        &self,
        trainer_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<(), Error> {
        if self.exercises.delete_owned(&exercise_id, &trainer_id).await? {
            return Ok(());
        }
        // Nothing matched: tell a foreign owner apart from a missing row.
        self.load_owned(&trainer_id, &exercise_id).await?;
        Err(Error::not_found(format!("exercise {exercise_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockable::DefaultClock;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::MockExerciseRepository;
    use crate::domain::test_entities::exercise_for;
    use crate::domain::{ErrorCode, ExerciseDetails};

    fn service(exercises: MockExerciseRepository) -> ExerciseService {
        ExerciseService::new(Arc::new(exercises), Arc::new(DefaultClock))
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_video_url_is_rejected_before_saving() {
        let mut exercises = MockExerciseRepository::new();
        exercises.expect_insert().times(0);

        let err = service(exercises)
            .create_exercise(CreateExerciseRequest {
                trainer_id: UserId::random(),
                details: ExerciseDetails {
                    name: "Deadlift".to_owned(),
                    video_url: Some("not a url".to_owned()),
                    ..ExerciseDetails::default()
                },
            })
            .await
            .expect_err("invalid url");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn foreign_trainers_cannot_update() {
        let exercise = exercise_for(UserId::random());
        let exercise_id = exercise.id();
        let mut exercises = MockExerciseRepository::new();
        exercises
            .expect_find_by_id()
            .returning(move |_| Ok(Some(exercise.clone())));
        exercises.expect_update().times(0);

        let err = service(exercises)
            .update_exercise(UpdateExerciseRequest {
                trainer_id: UserId::random(),
                exercise_id,
                details: ExerciseDetails {
                    name: "Renamed".to_owned(),
                    ..ExerciseDetails::default()
                },
            })
            .await
            .expect_err("not the owner");

        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case::foreign(true, ErrorCode::Forbidden)]
    #[case::missing(false, ErrorCode::NotFound)]
    #[tokio::test]
    async fn unmatched_delete_explains_itself(#[case] exists: bool, #[case] expected: ErrorCode) {
        let exercise = exercise_for(UserId::random());
        let exercise_id = exercise.id();
        let mut exercises = MockExerciseRepository::new();
        exercises
            .expect_delete_owned()
            .times(1)
            .returning(|_, _| Ok(false));
        exercises
            .expect_find_by_id()
            .returning(move |_| Ok(exists.then(|| exercise.clone())));

        let err = service(exercises)
            .delete_exercise(UserId::random(), exercise_id)
            .await
            .expect_err("nothing deleted");

        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn owner_delete_succeeds_in_one_call() {
        let mut exercises = MockExerciseRepository::new();
        exercises
            .expect_delete_owned()
            .times(1)
            .returning(|_, _| Ok(true));
        exercises.expect_find_by_id().times(0);

        service(exercises)
            .delete_exercise(UserId::random(), ExerciseId::random())
            .await
            .expect("deleted");
    }
}
