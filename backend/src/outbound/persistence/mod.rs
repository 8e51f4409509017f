//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one domain port over a shared [`DbPool`].
//! Diesel row structs (`models`) and table definitions (`schema`) stay
//! private to this module; rows are rehydrated through the validating
//! domain constructors, and a row the domain rejects is reported as a query
//! error rather than handed upwards.
//!
//! # Example
//!
//! ```ignore
//! use fitcoach::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/fitcoach")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_assignment_repository;
mod diesel_exercise_repository;
mod diesel_training_plan_repository;
mod diesel_upload_repository;
mod diesel_user_repository;
mod diesel_workout_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use diesel_exercise_repository::DieselExerciseRepository;
pub use diesel_training_plan_repository::DieselTrainingPlanRepository;
pub use diesel_upload_repository::DieselUploadRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_workout_repository::DieselWorkoutRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
