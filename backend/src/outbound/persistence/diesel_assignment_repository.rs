//! PostgreSQL-backed `AssignmentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, AssignmentPlanning, AssignmentStatus, ExerciseId,
    PerformanceLog, Prescription, UploadId, UserId, WorkoutId,
};

use super::error_mapping::{
    from_db_int, invalid_row, map_diesel_error, map_pool_error, to_db_int,
};
use super::models::{AssignmentRow, AssignmentWrite};
use super::pool::{DbPool, PoolError};
use super::schema::{assignments, workouts};

/// Diesel-backed implementation of the `AssignmentRepository` port.
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
}

impl DieselAssignmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AssignmentRepositoryError {
    map_pool_error(error, AssignmentRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AssignmentRepositoryError {
    map_diesel_error(
        error,
        AssignmentRepositoryError::query,
        AssignmentRepositoryError::connection,
    )
}

fn optional_count(field: &'static str, value: Option<i32>) -> Result<Option<u32>, String> {
    value.map(|stored| from_db_int(field, stored)).transpose()
}

fn row_to_assignment(row: AssignmentRow) -> Result<Assignment, AssignmentRepositoryError> {
    let id = row.id;
    let invalid = |reason: String| {
        AssignmentRepositoryError::query(invalid_row("assignments", id, reason))
    };
    let status: AssignmentStatus = row.status.parse().map_err(|err| invalid(format!("{err}")))?;
    let sequence = from_db_int("sequence", row.sequence).map_err(invalid)?;
    let sets = optional_count("sets", row.sets).map_err(invalid)?;
    let achieved_sets = optional_count("achieved_sets", row.achieved_sets).map_err(invalid)?;

    Assignment::new(AssignmentDraft {
        id: AssignmentId::from_uuid(id),
        workout_id: WorkoutId::from_uuid(row.workout_id),
        planning: AssignmentPlanning {
            exercise_id: ExerciseId::from_uuid(row.exercise_id),
            prescription: Prescription {
                sets,
                reps: row.reps,
                rest: row.rest,
                tempo: row.tempo,
                weight: row.weight,
                duration: row.duration,
            },
            trainer_notes: row.trainer_notes,
            sequence,
        },
        status,
        client_notes: row.client_notes,
        performance: PerformanceLog {
            achieved_sets,
            achieved_reps: row.achieved_reps,
            achieved_weight: row.achieved_weight,
            achieved_duration: row.achieved_duration,
            notes: row.performance_notes,
        },
        upload_id: row.upload_id.map(UploadId::from_uuid),
        feedback: row.feedback,
        assigned_at: row.assigned_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| invalid(err.to_string()))
}

fn assignment_write(
    assignment: &Assignment,
) -> Result<AssignmentWrite<'_>, AssignmentRepositoryError> {
    let prescription = assignment.prescription();
    let performance = assignment.performance();
    let counts = || -> Result<_, String> {
        Ok((
            to_db_int("sequence", assignment.sequence())?,
            prescription.sets.map(|sets| to_db_int("sets", sets)).transpose()?,
            performance
                .achieved_sets
                .map(|sets| to_db_int("achieved_sets", sets))
                .transpose()?,
        ))
    };
    let (sequence, sets, achieved_sets) = counts().map_err(AssignmentRepositoryError::query)?;

    Ok(AssignmentWrite {
        id: *assignment.id().as_uuid(),
        workout_id: *assignment.workout_id().as_uuid(),
        exercise_id: *assignment.exercise_id().as_uuid(),
        sets,
        reps: prescription.reps.as_deref(),
        rest: prescription.rest.as_deref(),
        tempo: prescription.tempo.as_deref(),
        weight: prescription.weight.as_deref(),
        duration: prescription.duration.as_deref(),
        trainer_notes: assignment.trainer_notes(),
        sequence,
        status: assignment.status().as_str(),
        client_notes: assignment.client_notes(),
        achieved_sets,
        achieved_reps: performance.achieved_reps.as_deref(),
        achieved_weight: performance.achieved_weight.as_deref(),
        achieved_duration: performance.achieved_duration.as_deref(),
        performance_notes: performance.notes.as_deref(),
        upload_id: assignment.upload_id().map(|id| *id.as_uuid()),
        feedback: assignment.feedback(),
        assigned_at: assignment.assigned_at(),
        updated_at: assignment.updated_at(),
    })
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn find_by_id(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        assignments::table
            .filter(assignments::id.eq(id.as_uuid()))
            .select(AssignmentRow::as_select())
            .first::<AssignmentRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_assignment)
            .transpose()
    }

    async fn list_for_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        assignments::table
            .filter(assignments::workout_id.eq(workout_id.as_uuid()))
            .order((assignments::sequence.asc(), assignments::assigned_at.asc()))
            .select(AssignmentRow::as_select())
            .load::<AssignmentRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_assignment)
            .collect()
    }

    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        let row = assignment_write(assignment)?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(assignments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(&self, assignment: &Assignment) -> Result<bool, AssignmentRepositoryError> {
        let row = assignment_write(assignment)?;
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(assignments::table.filter(assignments::id.eq(row.id)))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_owned(
        &self,
        id: &AssignmentId,
        trainer_id: &UserId,
    ) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let owned_workouts = workouts::table
            .filter(workouts::trainer_id.eq(*trainer_id.as_uuid()))
            .select(workouts::id);
        let deleted = diesel::delete(
            assignments::table
                .filter(assignments::id.eq(*id.as_uuid()))
                .filter(assignments::workout_id.eq_any(owned_workouts)),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete(&self, id: &AssignmentId) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(assignments::table.filter(assignments::id.eq(*id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    fn row(status: &str) -> AssignmentRow {
        let now = Utc::now();
        AssignmentRow {
            id: Uuid::new_v4(),
            workout_id: Uuid::new_v4(),
            exercise_id: Uuid::new_v4(),
            sets: Some(4),
            reps: Some("8-12".to_owned()),
            rest: None,
            tempo: None,
            weight: None,
            duration: None,
            trainer_notes: String::new(),
            sequence: 1,
            status: status.to_owned(),
            client_notes: String::new(),
            achieved_sets: None,
            achieved_reps: None,
            achieved_weight: None,
            achieved_duration: None,
            performance_notes: None,
            upload_id: Some(Uuid::new_v4()),
            feedback: String::new(),
            assigned_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn stored_status_and_upload_reference_survive() {
        let stored = row("submitted");
        let upload = stored.upload_id;

        let assignment = row_to_assignment(stored).expect("valid row");

        assert_eq!(assignment.status(), AssignmentStatus::Submitted);
        assert_eq!(assignment.upload_id().map(|id| *id.as_uuid()), upload);
        assert_eq!(assignment.prescription().sets, Some(4));
    }

    #[rstest]
    fn unknown_status_is_a_query_error() {
        let err = row_to_assignment(row("archived")).expect_err("invalid status");
        assert!(matches!(err, AssignmentRepositoryError::Query { .. }));
    }
}
