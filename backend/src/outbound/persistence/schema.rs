//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes a table, update the matching block here (or regenerate
//! with `diesel print-schema` against a migrated database).

diesel::table! {
    /// Trainer and client accounts.
    ///
    /// `trainer_id` is the client-side half of the roster link; the
    /// trainer-side half lives in `trainer_clients`.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Lower-cased, unique.
        email -> Varchar,
        /// `trainer` or `client`.
        role -> Varchar,
        trainer_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Clients managed by each trainer. `client_id` is unique.
    trainer_clients (trainer_id, client_id) {
        trainer_id -> Uuid,
        client_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Exercise library entries owned by trainers.
    exercises (id) {
        id -> Uuid,
        trainer_id -> Uuid,
        name -> Varchar,
        description -> Text,
        muscle_group -> Text,
        execution_technique -> Text,
        applicability -> Text,
        difficulty -> Text,
        video_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    training_plans (id) {
        id -> Uuid,
        trainer_id -> Uuid,
        client_id -> Uuid,
        name -> Varchar,
        description -> Text,
        start_date -> Nullable<Timestamptz>,
        end_date -> Nullable<Timestamptz>,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sessions within a plan. Owner columns are copied from the plan.
    workouts (id) {
        id -> Uuid,
        plan_id -> Uuid,
        trainer_id -> Uuid,
        client_id -> Uuid,
        name -> Varchar,
        /// ISO weekday, 1..=7.
        day_of_week -> Nullable<Int2>,
        notes -> Text,
        sequence -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Exercises placed into workouts, with client progress and feedback.
    assignments (id) {
        id -> Uuid,
        workout_id -> Uuid,
        exercise_id -> Uuid,
        sets -> Nullable<Int4>,
        reps -> Nullable<Text>,
        rest -> Nullable<Text>,
        tempo -> Nullable<Text>,
        weight -> Nullable<Text>,
        duration -> Nullable<Text>,
        trainer_notes -> Text,
        sequence -> Int4,
        /// `assigned`, `submitted`, `reviewed` or `completed`.
        status -> Varchar,
        client_notes -> Text,
        achieved_sets -> Nullable<Int4>,
        achieved_reps -> Nullable<Text>,
        achieved_weight -> Nullable<Text>,
        achieved_duration -> Nullable<Text>,
        performance_notes -> Nullable<Text>,
        /// Soft reference to the live upload.
        upload_id -> Nullable<Uuid>,
        feedback -> Text,
        assigned_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Metadata for objects uploaded to storage.
    uploads (id) {
        id -> Uuid,
        assignment_id -> Uuid,
        client_id -> Uuid,
        trainer_id -> Uuid,
        object_key -> Text,
        file_name -> Text,
        content_type -> Varchar,
        size_bytes -> Int8,
        uploaded_at -> Timestamptz,
    }
}

diesel::joinable!(trainer_clients -> users (client_id));
diesel::joinable!(workouts -> training_plans (plan_id));
diesel::joinable!(assignments -> workouts (workout_id));
diesel::joinable!(uploads -> assignments (assignment_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    trainer_clients,
    exercises,
    training_plans,
    workouts,
    assignments,
    uploads,
);
