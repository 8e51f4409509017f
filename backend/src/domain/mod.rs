//! Domain primitives, aggregates and services.
//!
//! Purpose: model the trainer → plan → workout → assignment hierarchy, the
//! assignment lifecycle and the video upload saga without knowing about any
//! transport or storage technology.
//!
//! Public surface:
//! - Entities: [`User`], [`Exercise`], [`TrainingPlan`], [`Workout`],
//!   [`Assignment`], [`Upload`], each built from a `*Draft` through a
//!   validating constructor.
//! - Authorization: [`OwnershipChain`] resolves trainer and client access by
//!   walking assignment → workout → plan.
//! - Services implementing the driving ports in [`ports`]: roster,
//!   exercise, plan, workout and assignment management for trainers;
//!   progress and read access for clients; the upload saga for both.
//! - [`Error`] / [`ErrorCode`]: the transport-agnostic failure payload.

pub mod assignment_lifecycle;
pub mod error;
pub mod ports;

mod assignment;
mod assignment_service;
mod authorization;
mod cascade;
mod client_service;
mod exercise;
mod exercise_service;
mod ids;
mod roster_service;
mod training_plan;
mod training_plan_service;
mod upload;
mod upload_saga;
mod user;
mod workout;
mod workout_service;

#[cfg(test)]
mod test_entities;

pub use self::assignment::{
    Assignment, AssignmentDraft, AssignmentPlanning, AssignmentValidationError, PerformanceLog,
    Prescription,
};
pub use self::assignment_lifecycle::{AssignmentStatus, ParseAssignmentStatusError, TransitionError};
pub use self::assignment_service::AssignmentService;
pub use self::authorization::{Actor, AuthorizedAssignment, OwnershipChain};
pub use self::cascade::{
    CascadeInventory, CascadeReport, CascadeSweeper, SweepFailure, SweepStep,
};
pub use self::client_service::ClientService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::exercise::{Exercise, ExerciseDetails, ExerciseDraft, ExerciseValidationError};
pub use self::exercise_service::ExerciseService;
pub use self::ids::{AssignmentId, ExerciseId, ParseIdError, PlanId, UploadId, UserId, WorkoutId};
pub use self::roster_service::RosterService;
pub use self::training_plan::{
    PlanDetails, TrainingPlan, TrainingPlanDraft, TrainingPlanValidationError,
};
pub use self::training_plan_service::TrainingPlanService;
pub use self::upload::{
    ObjectKey, Upload, UploadDraft, UploadValidationError, VideoContentType,
};
pub use self::upload_saga::{
    CompensationOutcome, DEFAULT_URL_TTL, UploadSagaService, UploadSettings,
    compensate_orphaned_upload,
};
pub use self::user::{
    EmailAddress, ParseUserRoleError, User, UserDraft, UserRole, UserValidationError,
};
pub use self::workout::{Workout, WorkoutDetails, WorkoutDraft, WorkoutValidationError};
pub use self::workout_service::WorkoutService;
