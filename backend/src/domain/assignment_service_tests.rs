//! Tests for the trainer-side assignment service.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockAssignmentRepository, MockExerciseRepository, MockObjectStorage,
    MockTrainingPlanRepository, MockUploadRepository, MockWorkoutRepository,
};
use crate::domain::test_entities::{assignment_in, exercise_for, plan_for, planning, workout_in};
use crate::domain::{AssignmentStatus, ErrorCode, Exercise, Workout};

struct Mocks {
    exercises: MockExerciseRepository,
    workouts: MockWorkoutRepository,
    assignments: MockAssignmentRepository,
}

impl Mocks {
    fn new() -> Self {
        Self {
            exercises: MockExerciseRepository::new(),
            workouts: MockWorkoutRepository::new(),
            assignments: MockAssignmentRepository::new(),
        }
    }

    fn with_workout(mut self, workout: Workout) -> Self {
        self.workouts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(workout.clone())));
        self
    }

    fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(assignment.clone())));
        self
    }

    fn with_exercise(mut self, exercise: Option<Exercise>) -> Self {
        self.exercises
            .expect_find_by_id()
            .returning(move |_| Ok(exercise.clone()));
        self
    }

    fn service(self) -> AssignmentService {
        let workouts: Arc<dyn crate::domain::ports::WorkoutRepository> = Arc::new(self.workouts);
        let assignments: Arc<dyn AssignmentRepository> = Arc::new(self.assignments);
        let chain = OwnershipChain::new(
            Arc::new(MockTrainingPlanRepository::new()),
            Arc::clone(&workouts),
            Arc::clone(&assignments),
        );
        let sweeper = CascadeSweeper::new(
            workouts,
            Arc::clone(&assignments),
            Arc::new(MockUploadRepository::new()),
            Arc::new(MockObjectStorage::new()),
        );
        AssignmentService::new(
            Arc::new(self.exercises),
            assignments,
            chain,
            sweeper,
            Arc::new(DefaultClock),
        )
    }
}

fn owned_workout() -> Workout {
    workout_in(&plan_for(UserId::random(), UserId::random()))
}

#[rstest]
#[tokio::test]
async fn assigning_an_owned_exercise_starts_in_assigned() {
    let workout = owned_workout();
    let (trainer_id, workout_id) = (workout.trainer_id(), workout.id());
    let exercise = exercise_for(trainer_id);
    let exercise_id = exercise.id();

    let mut mocks = Mocks::new()
        .with_workout(workout)
        .with_exercise(Some(exercise));
    mocks
        .assignments
        .expect_insert()
        .withf(move |a| a.workout_id() == workout_id && a.exercise_id() == exercise_id)
        .times(1)
        .returning(|_| Ok(()));

    let assignment = mocks
        .service()
        .assign_exercise(AssignExerciseRequest {
            trainer_id,
            workout_id,
            planning: planning(exercise_id, 1),
        })
        .await
        .expect("assigned");

    assert_eq!(assignment.status(), AssignmentStatus::Assigned);
    assert_eq!(assignment.sequence(), 1);
}

#[rstest]
#[case::foreign(Some(exercise_for(UserId::random())), ErrorCode::Forbidden)]
#[case::missing(None, ErrorCode::NotFound)]
#[tokio::test]
async fn exercise_must_belong_to_the_trainer(
    #[case] exercise: Option<Exercise>,
    #[case] expected: ErrorCode,
) {
    let workout = owned_workout();
    let (trainer_id, workout_id) = (workout.trainer_id(), workout.id());

    let mut mocks = Mocks::new().with_workout(workout).with_exercise(exercise);
    mocks.assignments.expect_insert().times(0);

    let err = mocks
        .service()
        .assign_exercise(AssignExerciseRequest {
            trainer_id,
            workout_id,
            planning: planning(ExerciseId::random(), 0),
        })
        .await
        .expect_err("exercise check fails");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn swapping_the_exercise_revalidates_ownership() {
    let workout = owned_workout();
    let trainer_id = workout.trainer_id();
    let assignment = assignment_in(&workout);
    let assignment_id = assignment.id();

    let mut mocks = Mocks::new()
        .with_workout(workout)
        .with_assignment(assignment)
        .with_exercise(Some(exercise_for(UserId::random())));
    mocks.assignments.expect_update().times(0);

    let err = mocks
        .service()
        .update_assignment(UpdateAssignmentRequest {
            trainer_id,
            assignment_id,
            workout_id: None,
            planning: planning(ExerciseId::random(), 4),
        })
        .await
        .expect_err("foreign exercise");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn keeping_the_exercise_skips_the_ownership_lookup() {
    let workout = owned_workout();
    let trainer_id = workout.trainer_id();
    let assignment = assignment_in(&workout);
    let (assignment_id, exercise_id) = (assignment.id(), assignment.exercise_id());

    let mut mocks = Mocks::new().with_workout(workout).with_assignment(assignment);
    mocks.exercises.expect_find_by_id().times(0);
    mocks.assignments.expect_update().times(1).returning(|_| Ok(true));

    let updated = mocks
        .service()
        .update_assignment(UpdateAssignmentRequest {
            trainer_id,
            assignment_id,
            workout_id: None,
            planning: planning(exercise_id, 7),
        })
        .await
        .expect("replanned");

    assert_eq!(updated.sequence(), 7);
}

#[rstest]
#[tokio::test]
async fn moving_an_assignment_is_rejected() {
    let workout = owned_workout();
    let trainer_id = workout.trainer_id();
    let assignment = assignment_in(&workout);
    let (assignment_id, exercise_id) = (assignment.id(), assignment.exercise_id());

    let mut mocks = Mocks::new().with_workout(workout).with_assignment(assignment);
    mocks.assignments.expect_update().times(0);

    let err = mocks
        .service()
        .update_assignment(UpdateAssignmentRequest {
            trainer_id,
            assignment_id,
            workout_id: Some(WorkoutId::random()),
            planning: planning(exercise_id, 0),
        })
        .await
        .expect_err("parentage is fixed");

    assert_eq!(err.reason(), Some("parent_mismatch"));
}

#[rstest]
#[case::review(Some(AssignmentStatus::Reviewed), AssignmentStatus::Reviewed)]
#[case::reissue(Some(AssignmentStatus::Assigned), AssignmentStatus::Assigned)]
#[case::text_only(None, AssignmentStatus::Assigned)]
#[tokio::test]
async fn feedback_moves_to_trainer_targets(
    #[case] target: Option<AssignmentStatus>,
    #[case] expected: AssignmentStatus,
) {
    let workout = owned_workout();
    let trainer_id = workout.trainer_id();
    let assignment = assignment_in(&workout);
    let assignment_id = assignment.id();

    let mut mocks = Mocks::new().with_workout(workout).with_assignment(assignment);
    mocks.assignments.expect_update().times(1).returning(|_| Ok(true));

    let updated = mocks
        .service()
        .submit_feedback(SubmitFeedbackRequest {
            trainer_id,
            assignment_id,
            feedback: "Depth looks good".to_owned(),
            status: target,
        })
        .await
        .expect("feedback stored");

    assert_eq!(updated.status(), expected);
    assert_eq!(updated.feedback(), "Depth looks good");
}

#[rstest]
#[case::submitted(AssignmentStatus::Submitted)]
#[case::completed(AssignmentStatus::Completed)]
#[tokio::test]
async fn feedback_rejects_client_owned_targets(#[case] target: AssignmentStatus) {
    let workout = owned_workout();
    let trainer_id = workout.trainer_id();
    let assignment = assignment_in(&workout);
    let assignment_id = assignment.id();

    let mut mocks = Mocks::new().with_workout(workout).with_assignment(assignment);
    mocks.assignments.expect_update().times(0);

    let err = mocks
        .service()
        .submit_feedback(SubmitFeedbackRequest {
            trainer_id,
            assignment_id,
            feedback: String::new(),
            status: Some(target),
        })
        .await
        .expect_err("not a trainer target");

    assert_eq!(err.code(), ErrorCode::InvalidTransition);
}

#[rstest]
#[tokio::test]
async fn feedback_on_a_concurrently_deleted_assignment_is_not_found() {
    let workout = owned_workout();
    let trainer_id = workout.trainer_id();
    let assignment = assignment_in(&workout);
    let assignment_id = assignment.id();

    let mut mocks = Mocks::new().with_workout(workout).with_assignment(assignment);
    mocks.assignments.expect_update().times(1).returning(|_| Ok(false));

    let err = mocks
        .service()
        .submit_feedback(SubmitFeedbackRequest {
            trainer_id,
            assignment_id,
            feedback: "Late note".to_owned(),
            status: Some(AssignmentStatus::Reviewed),
        })
        .await
        .expect_err("row is gone");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn foreign_trainer_cannot_read_assignment() {
    let workout = owned_workout();
    let assignment = assignment_in(&workout);
    let assignment_id = assignment.id();

    let err = Mocks::new()
        .with_workout(workout)
        .with_assignment(assignment)
        .service()
        .get_assignment(UserId::random(), assignment_id)
        .await
        .expect_err("not the owner");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}
