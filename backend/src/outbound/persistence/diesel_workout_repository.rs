//! PostgreSQL-backed `WorkoutRepository`.
//!
//! `trainer_id` and `client_id` are copies of the parent plan's owners. They
//! are written by the insert only; an update rewrites the leaf columns and
//! leaves the copies alone.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{WorkoutRepository, WorkoutRepositoryError};
use crate::domain::{PlanId, UserId, Workout, WorkoutDetails, WorkoutDraft, WorkoutId};

use super::error_mapping::{
    from_db_int, invalid_row, map_diesel_error, map_pool_error, to_db_int,
};
use super::models::{NewWorkoutRow, WorkoutRow, WorkoutUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::workouts;

/// Diesel-backed implementation of the `WorkoutRepository` port.
#[derive(Clone)]
pub struct DieselWorkoutRepository {
    pool: DbPool,
}

impl DieselWorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn delete_matching(
        &self,
        id: &WorkoutId,
        trainer_id: Option<&UserId>,
    ) -> Result<bool, WorkoutRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = diesel::delete(workouts::table)
            .filter(workouts::id.eq(*id.as_uuid()))
            .into_boxed();
        if let Some(trainer_id) = trainer_id {
            query = query.filter(workouts::trainer_id.eq(*trainer_id.as_uuid()));
        }
        let deleted = query.execute(&mut conn).await.map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}

fn pool_error(error: PoolError) -> WorkoutRepositoryError {
    map_pool_error(error, WorkoutRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> WorkoutRepositoryError {
    map_diesel_error(
        error,
        WorkoutRepositoryError::query,
        WorkoutRepositoryError::connection,
    )
}

fn row_to_workout(row: WorkoutRow) -> Result<Workout, WorkoutRepositoryError> {
    let id = row.id;
    let invalid =
        |reason: String| WorkoutRepositoryError::query(invalid_row("workouts", id, reason));
    let day_of_week = row
        .day_of_week
        .map(|day| u8::try_from(day).map_err(|_| format!("day_of_week {day} is out of range")))
        .transpose()
        .map_err(invalid)?;
    let sequence = from_db_int("sequence", row.sequence).map_err(invalid)?;

    Workout::new(WorkoutDraft {
        id: WorkoutId::from_uuid(id),
        plan_id: PlanId::from_uuid(row.plan_id),
        trainer_id: UserId::from_uuid(row.trainer_id),
        client_id: UserId::from_uuid(row.client_id),
        details: WorkoutDetails {
            name: row.name,
            day_of_week,
            notes: row.notes,
            sequence,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| invalid(err.to_string()))
}

fn workout_sequence(workout: &Workout) -> Result<i32, WorkoutRepositoryError> {
    to_db_int("sequence", workout.sequence()).map_err(WorkoutRepositoryError::query)
}

#[async_trait]
impl WorkoutRepository for DieselWorkoutRepository {
    async fn find_by_id(&self, id: &WorkoutId) -> Result<Option<Workout>, WorkoutRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        workouts::table
            .filter(workouts::id.eq(id.as_uuid()))
            .select(WorkoutRow::as_select())
            .first::<WorkoutRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_workout)
            .transpose()
    }

    async fn list_for_plan(
        &self,
        plan_id: &PlanId,
    ) -> Result<Vec<Workout>, WorkoutRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        workouts::table
            .filter(workouts::plan_id.eq(plan_id.as_uuid()))
            .order((workouts::sequence.asc(), workouts::day_of_week.asc()))
            .select(WorkoutRow::as_select())
            .load::<WorkoutRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_workout)
            .collect()
    }

    async fn insert(&self, workout: &Workout) -> Result<(), WorkoutRepositoryError> {
        let sequence = workout_sequence(workout)?;
        let row = NewWorkoutRow {
            id: *workout.id().as_uuid(),
            plan_id: *workout.plan_id().as_uuid(),
            trainer_id: *workout.trainer_id().as_uuid(),
            client_id: *workout.client_id().as_uuid(),
            name: workout.name(),
            day_of_week: workout.day_of_week().map(i16::from),
            notes: workout.notes(),
            sequence,
            created_at: workout.created_at(),
            updated_at: workout.updated_at(),
        };

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(workouts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(&self, workout: &Workout) -> Result<bool, WorkoutRepositoryError> {
        let changes = WorkoutUpdate {
            name: workout.name(),
            day_of_week: workout.day_of_week().map(i16::from),
            notes: workout.notes(),
            sequence: workout_sequence(workout)?,
            updated_at: workout.updated_at(),
        };

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = workouts::table.filter(workouts::id.eq(*workout.id().as_uuid()));
        let updated = diesel::update(target)
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_owned(
        &self,
        id: &WorkoutId,
        trainer_id: &UserId,
    ) -> Result<bool, WorkoutRepositoryError> {
        self.delete_matching(id, Some(trainer_id)).await
    }

    async fn delete(&self, id: &WorkoutId) -> Result<bool, WorkoutRepositoryError> {
        self.delete_matching(id, None).await
    }
}
