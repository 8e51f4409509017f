//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories and object storage) are implemented by the
//! adapters under `outbound`. Driving ports are implemented by the domain
//! services and called by whatever transport sits in front of them.

mod macros;
pub(crate) use macros::{define_port_error, persistence_error_into_domain};

mod assignment_management;
mod assignment_repository;
mod client_progress;
mod exercise_management;
mod exercise_repository;
mod object_storage;
mod roster_management;
mod training_plan_management;
mod training_plan_repository;
mod upload_repository;
mod user_repository;
mod video_upload;
mod workout_management;
mod workout_repository;

#[cfg(test)]
pub use assignment_management::MockAssignmentManagement;
pub use assignment_management::{
    AssignExerciseRequest, AssignmentManagement, SubmitFeedbackRequest, UpdateAssignmentRequest,
};
#[cfg(test)]
pub use assignment_repository::MockAssignmentRepository;
pub use assignment_repository::{
    AssignmentRepository, AssignmentRepositoryError, FixtureAssignmentRepository,
};
#[cfg(test)]
pub use client_progress::{MockClientProgress, MockClientView};
pub use client_progress::{ClientProgress, ClientView, LogPerformanceRequest, UpdateStatusRequest};
#[cfg(test)]
pub use exercise_management::MockExerciseManagement;
pub use exercise_management::{
    CreateExerciseRequest, ExerciseManagement, UpdateExerciseRequest,
};
#[cfg(test)]
pub use exercise_repository::MockExerciseRepository;
pub use exercise_repository::{
    ExerciseRepository, ExerciseRepositoryError, FixtureExerciseRepository,
};
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{FixtureObjectStorage, ObjectStorage, ObjectStorageError, PresignedUrl};
#[cfg(test)]
pub use roster_management::MockRosterManagement;
pub use roster_management::{AddClientRequest, RosterManagement};
#[cfg(test)]
pub use training_plan_management::MockTrainingPlanManagement;
pub use training_plan_management::{CreatePlanRequest, TrainingPlanManagement, UpdatePlanRequest};
#[cfg(test)]
pub use training_plan_repository::MockTrainingPlanRepository;
pub use training_plan_repository::{
    FixtureTrainingPlanRepository, TrainingPlanRepository, TrainingPlanRepositoryError,
};
#[cfg(test)]
pub use upload_repository::MockUploadRepository;
pub use upload_repository::{FixtureUploadRepository, UploadRepository, UploadRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use video_upload::MockVideoUpload;
pub use video_upload::{
    ConfirmUploadRequest, DownloadUrlRequest, RequestUploadUrlRequest, UploadTicket, VideoUpload,
};
#[cfg(test)]
pub use workout_management::MockWorkoutManagement;
pub use workout_management::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutManagement};
#[cfg(test)]
pub use workout_repository::MockWorkoutRepository;
pub use workout_repository::{FixtureWorkoutRepository, WorkoutRepository, WorkoutRepositoryError};
