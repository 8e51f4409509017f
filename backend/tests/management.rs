//! Trainer management reads and writes: roster, library, plans and cascades.

use fitcoach::domain::ports::{
    AddClientRequest, ConfirmUploadRequest, CreateExerciseRequest, CreatePlanRequest,
    CreateWorkoutRequest, RequestUploadUrlRequest, UpdatePlanRequest,
};
use fitcoach::domain::{Assignment, ErrorCode, ExerciseDetails, SweepStep};
use fitcoach::test_support::{Fault, StoreCounts};
use rstest::rstest;

mod support;

use support::{Coaching, coaching, plan_details, workout_details};

async fn upload_video(world: &Coaching, assignment: &Assignment) {
    let uploads = &world.harness.services.uploads;
    let ticket = uploads
        .request_upload_url(RequestUploadUrlRequest {
            client_id: world.client.id(),
            assignment_id: assignment.id(),
            content_type: "video/webm".to_owned(),
        })
        .await
        .expect("upload url issued");
    world.harness.storage.put_object(&ticket.object_key);
    uploads
        .confirm_upload(ConfirmUploadRequest {
            client_id: world.client.id(),
            assignment_id: assignment.id(),
            object_key: ticket.object_key.as_str().to_owned(),
            file_name: "set.webm".to_owned(),
            size_bytes: 2_048,
            content_type: "video/webm".to_owned(),
        })
        .await
        .expect("upload confirmed");
}

#[rstest]
#[tokio::test]
async fn a_client_belongs_to_one_trainer() {
    let world = coaching().await;
    let rival = world
        .harness
        .store
        .seed_trainer("Rival", "rival@example.test")
        .expect("trainer seeded");

    let err = world
        .harness
        .services
        .roster
        .add_client(AddClientRequest {
            trainer_id: rival.id(),
            email: "cal@example.test".to_owned(),
        })
        .await
        .expect_err("already linked");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let again = world
        .harness
        .services
        .roster
        .add_client(AddClientRequest {
            trainer_id: world.trainer.id(),
            email: "cal@example.test".to_owned(),
        })
        .await
        .expect("relinking is idempotent");
    assert_eq!(again.trainer_id(), Some(world.trainer.id()));

    let clients = world
        .harness
        .services
        .roster
        .list_clients(world.trainer.id())
        .await
        .expect("clients listed");
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].id(), world.client.id());
}

#[rstest]
#[tokio::test]
async fn half_written_link_is_rolled_back() {
    let world = coaching().await;
    world
        .harness
        .store
        .seed_client("Dana", "dana@example.test")
        .expect("client seeded");
    world
        .harness
        .failures
        .fail("users.set_trainer", Fault::Unavailable);

    let err = world
        .harness
        .services
        .roster
        .add_client(AddClientRequest {
            trainer_id: world.trainer.id(),
            email: "dana@example.test".to_owned(),
        })
        .await
        .expect_err("second write fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);

    world.harness.failures.heal_all();
    let clients = world
        .harness
        .services
        .roster
        .list_clients(world.trainer.id())
        .await
        .expect("clients listed");
    assert_eq!(clients.len(), 1);
}

#[rstest]
#[tokio::test]
async fn exercise_library_is_private_to_its_trainer() {
    let world = coaching().await;
    let rival = world
        .harness
        .store
        .seed_trainer("Rival", "rival@example.test")
        .expect("trainer seeded");
    let exercises = &world.harness.services.exercises;

    let err = exercises
        .get_exercise(rival.id(), world.exercise.id())
        .await
        .expect_err("foreign exercise");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    let err = exercises
        .delete_exercise(rival.id(), world.exercise.id())
        .await
        .expect_err("foreign exercise");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    exercises
        .create_exercise(CreateExerciseRequest {
            trainer_id: rival.id(),
            details: ExerciseDetails {
                name: "Push-up".to_owned(),
                ..ExerciseDetails::default()
            },
        })
        .await
        .expect("exercise created");
    let own = exercises
        .list_exercises(world.trainer.id())
        .await
        .expect("exercises listed");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].name(), "Goblet squat");
}

#[rstest]
#[tokio::test]
async fn activating_a_plan_deactivates_its_siblings() {
    let world = coaching().await;
    world.harness.clock.advance_minutes(5);

    let next = world
        .harness
        .services
        .plans
        .create_plan(CreatePlanRequest {
            trainer_id: world.trainer.id(),
            client_id: world.client.id(),
            details: plan_details("Hypertrophy", true),
        })
        .await
        .expect("plan created");

    let first = world.harness.store.plan(&world.plan.id()).expect("plan stored");
    assert!(!first.is_active());
    assert!(next.is_active());

    world.harness.clock.advance_minutes(5);
    world
        .harness
        .services
        .plans
        .update_plan(UpdatePlanRequest {
            trainer_id: world.trainer.id(),
            plan_id: world.plan.id(),
            client_id: None,
            details: plan_details("Strength base", true),
        })
        .await
        .expect("plan reactivated");
    let next = world.harness.store.plan(&next.id()).expect("plan stored");
    assert!(!next.is_active());

    let listed = world
        .harness
        .services
        .plans
        .list_plans_for_client(world.trainer.id(), world.client.id())
        .await
        .expect("plans listed");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.iter().filter(|plan| plan.is_active()).count(), 1);
}

#[rstest]
#[tokio::test]
async fn plans_cannot_target_unmanaged_clients() {
    let world = coaching().await;
    let stranger = world
        .harness
        .store
        .seed_client("Stranger", "stranger@example.test")
        .expect("client seeded");

    let err = world
        .harness
        .services
        .plans
        .create_plan(CreatePlanRequest {
            trainer_id: world.trainer.id(),
            client_id: stranger.id(),
            details: plan_details("Off the books", false),
        })
        .await
        .expect_err("not managed");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.reason(), Some("client_not_managed"));
}

#[rstest]
#[tokio::test]
async fn deleting_a_plan_removes_every_descendant() {
    let world = coaching().await;
    let second = world
        .harness
        .services
        .workouts
        .create_workout(CreateWorkoutRequest {
            trainer_id: world.trainer.id(),
            plan_id: world.plan.id(),
            details: workout_details("Upper body", 1),
        })
        .await
        .expect("workout created");
    let first = world.assign(0).await;
    world.assign(1).await;
    upload_video(&world, &first).await;
    assert_eq!(
        world.harness.store.counts(),
        StoreCounts {
            plans: 1,
            workouts: 2,
            assignments: 2,
            uploads: 1,
        }
    );

    let report = world
        .harness
        .services
        .plans
        .delete_plan(world.trainer.id(), world.plan.id())
        .await
        .expect("plan deleted");

    assert!(report.is_clean());
    assert_eq!((report.workouts, report.assignments, report.uploads), (2, 2, 1));
    assert_eq!(world.harness.store.counts(), StoreCounts::default());
    assert_eq!(world.harness.storage.deleted().len(), 1);
    let err = world
        .harness
        .services
        .workouts
        .get_workout(world.trainer.id(), second.id())
        .await
        .expect_err("workout gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn object_cleanup_failures_are_reported_not_raised() {
    let world = coaching().await;
    let assignment = world.assign(0).await;
    upload_video(&world, &assignment).await;
    world
        .harness
        .failures
        .fail("storage.delete_object", Fault::Unavailable);

    let report = world
        .harness
        .services
        .assignments
        .delete_assignment(world.trainer.id(), assignment.id())
        .await
        .expect("assignment deleted");

    assert_eq!(report.uploads, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].step, SweepStep::StoredObject);
    assert_eq!(world.harness.store.counts().assignments, 0);
    assert_eq!(world.harness.store.counts().uploads, 0);
}

#[rstest]
#[tokio::test]
async fn foreign_trainer_cannot_delete_a_workout() {
    let world = coaching().await;
    world.assign(0).await;
    let rival = world
        .harness
        .store
        .seed_trainer("Rival", "rival@example.test")
        .expect("trainer seeded");

    let err = world
        .harness
        .services
        .workouts
        .delete_workout(rival.id(), world.workout.id())
        .await
        .expect_err("not the owner");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(world.harness.store.counts().assignments, 1);
}
