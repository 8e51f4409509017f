//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Read rows are converted back through the
//! validating domain constructors by each repository.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    assignments, exercises, trainer_clients, training_plans, uploads, users, workouts,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub trainer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert and update payload for the users table.
///
/// `trainer_id` is deliberately absent: the roster link is only written by
/// `set_trainer`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserWrite<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = trainer_clients)]
pub(crate) struct NewTrainerClientRow {
    pub trainer_id: Uuid,
    pub client_id: Uuid,
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exercises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExerciseRow {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub name: String,
    pub description: String,
    pub muscle_group: String,
    pub execution_technique: String,
    pub applicability: String,
    pub difficulty: String,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = exercises)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ExerciseWrite<'a> {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub muscle_group: &'a str,
    pub execution_technique: &'a str,
    pub applicability: &'a str,
    pub difficulty: &'a str,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Training plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = training_plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrainingPlanRow {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = training_plans)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TrainingPlanWrite<'a> {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workouts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WorkoutRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub day_of_week: Option<i16>,
    pub notes: String,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for workouts.
///
/// Updates go through [`WorkoutUpdate`] so the copied owner columns are
/// written exactly once.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workouts)]
pub(crate) struct NewWorkoutRow<'a> {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub name: &'a str,
    pub day_of_week: Option<i16>,
    pub notes: &'a str,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = workouts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct WorkoutUpdate<'a> {
    pub name: &'a str,
    pub day_of_week: Option<i16>,
    pub notes: &'a str,
    pub sequence: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub sets: Option<i32>,
    pub reps: Option<String>,
    pub rest: Option<String>,
    pub tempo: Option<String>,
    pub weight: Option<String>,
    pub duration: Option<String>,
    pub trainer_notes: String,
    pub sequence: i32,
    pub status: String,
    pub client_notes: String,
    pub achieved_sets: Option<i32>,
    pub achieved_reps: Option<String>,
    pub achieved_weight: Option<String>,
    pub achieved_duration: Option<String>,
    pub performance_notes: Option<String>,
    pub upload_id: Option<Uuid>,
    pub feedback: String,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssignmentWrite<'a> {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub exercise_id: Uuid,
    pub sets: Option<i32>,
    pub reps: Option<&'a str>,
    pub rest: Option<&'a str>,
    pub tempo: Option<&'a str>,
    pub weight: Option<&'a str>,
    pub duration: Option<&'a str>,
    pub trainer_notes: &'a str,
    pub sequence: i32,
    pub status: &'a str,
    pub client_notes: &'a str,
    pub achieved_sets: Option<i32>,
    pub achieved_reps: Option<&'a str>,
    pub achieved_weight: Option<&'a str>,
    pub achieved_duration: Option<&'a str>,
    pub performance_notes: Option<&'a str>,
    pub upload_id: Option<Uuid>,
    pub feedback: &'a str,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = uploads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UploadRow {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    pub object_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = uploads)]
pub(crate) struct NewUploadRow<'a> {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    pub object_key: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}
