//! PostgreSQL-backed `ExerciseRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ExerciseRepository, ExerciseRepositoryError};
use crate::domain::{Exercise, ExerciseDetails, ExerciseDraft, ExerciseId, UserId};

use super::error_mapping::{invalid_row, map_diesel_error, map_pool_error};
use super::models::{ExerciseRow, ExerciseWrite};
use super::pool::{DbPool, PoolError};
use super::schema::exercises;

/// Diesel-backed implementation of the `ExerciseRepository` port.
#[derive(Clone)]
pub struct DieselExerciseRepository {
    pool: DbPool,
}

impl DieselExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ExerciseRepositoryError {
    map_pool_error(error, ExerciseRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ExerciseRepositoryError {
    map_diesel_error(
        error,
        ExerciseRepositoryError::query,
        ExerciseRepositoryError::connection,
    )
}

fn row_to_exercise(row: ExerciseRow) -> Result<Exercise, ExerciseRepositoryError> {
    let id = row.id;
    Exercise::new(ExerciseDraft {
        id: ExerciseId::from_uuid(id),
        trainer_id: UserId::from_uuid(row.trainer_id),
        details: ExerciseDetails {
            name: row.name,
            description: row.description,
            muscle_group: row.muscle_group,
            execution_technique: row.execution_technique,
            applicability: row.applicability,
            difficulty: row.difficulty,
            video_url: row.video_url,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| ExerciseRepositoryError::query(invalid_row("exercises", id, err)))
}

fn exercise_write(exercise: &Exercise) -> ExerciseWrite<'_> {
    ExerciseWrite {
        id: *exercise.id().as_uuid(),
        trainer_id: *exercise.trainer_id().as_uuid(),
        name: exercise.name(),
        description: exercise.description(),
        muscle_group: exercise.muscle_group(),
        execution_technique: exercise.execution_technique(),
        applicability: exercise.applicability(),
        difficulty: exercise.difficulty(),
        video_url: exercise.video_url().map(ToString::to_string),
        created_at: exercise.created_at(),
        updated_at: exercise.updated_at(),
    }
}

#[async_trait]
impl ExerciseRepository for DieselExerciseRepository {
    async fn find_by_id(
        &self,
        id: &ExerciseId,
    ) -> Result<Option<Exercise>, ExerciseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        exercises::table
            .filter(exercises::id.eq(id.as_uuid()))
            .select(ExerciseRow::as_select())
            .first::<ExerciseRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_exercise)
            .transpose()
    }

    async fn list_for_trainer(
        &self,
        trainer_id: &UserId,
    ) -> Result<Vec<Exercise>, ExerciseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        exercises::table
            .filter(exercises::trainer_id.eq(trainer_id.as_uuid()))
            .order(exercises::created_at.desc())
            .select(ExerciseRow::as_select())
            .load::<ExerciseRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_exercise)
            .collect()
    }

    async fn insert(&self, exercise: &Exercise) -> Result<(), ExerciseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(exercises::table)
            .values(&exercise_write(exercise))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(&self, exercise: &Exercise) -> Result<bool, ExerciseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = exercises::table.filter(exercises::id.eq(*exercise.id().as_uuid()));
        let updated = diesel::update(target)
            .set(&exercise_write(exercise))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_owned(
        &self,
        id: &ExerciseId,
        trainer_id: &UserId,
    ) -> Result<bool, ExerciseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            exercises::table
                .filter(exercises::id.eq(id.as_uuid()))
                .filter(exercises::trainer_id.eq(trainer_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
