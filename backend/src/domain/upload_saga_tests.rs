//! Tests for the upload saga service.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use url::Url;

use super::*;
use crate::domain::ports::{
    AssignmentRepositoryError, MockAssignmentRepository, MockObjectStorage,
    MockTrainingPlanRepository, MockUploadRepository, MockWorkoutRepository, ObjectStorageError,
    UploadRepositoryError,
};
use crate::domain::test_entities::{assignment_in, mp4, plan_for, upload_for, workout_in};
use crate::domain::{
    Actor, AssignmentId, AssignmentStatus, ErrorCode, UserId, Workout,
};

struct Graph {
    workout: Workout,
    assignment: Assignment,
}

#[fixture]
fn graph() -> Graph {
    let workout = workout_in(&plan_for(UserId::random(), UserId::random()));
    let assignment = assignment_in(&workout);
    Graph {
        workout,
        assignment,
    }
}

fn workouts_with(workout: Option<Workout>) -> MockWorkoutRepository {
    let mut workouts = MockWorkoutRepository::new();
    workouts
        .expect_find_by_id()
        .returning(move |_| Ok(workout.clone()));
    workouts
}

fn assignments_with(assignment: Assignment) -> MockAssignmentRepository {
    let mut assignments = MockAssignmentRepository::new();
    assignments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(assignment.clone())));
    assignments
}

fn service(
    workouts: MockWorkoutRepository,
    assignments: MockAssignmentRepository,
    uploads: MockUploadRepository,
    storage: MockObjectStorage,
) -> UploadSagaService {
    let assignments: Arc<dyn AssignmentRepository> = Arc::new(assignments);
    let chain = OwnershipChain::new(
        Arc::new(MockTrainingPlanRepository::new()),
        Arc::new(workouts),
        Arc::clone(&assignments),
    );
    UploadSagaService::new(
        chain,
        assignments,
        Arc::new(uploads),
        Arc::new(storage),
        Arc::new(DefaultClock),
        UploadSettings::default(),
    )
}

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("valid url")
}

fn confirm_request(graph: &Graph, key: &ObjectKey) -> ConfirmUploadRequest {
    ConfirmUploadRequest {
        client_id: graph.workout.client_id(),
        assignment_id: graph.assignment.id(),
        object_key: key.to_string(),
        file_name: "clip.mp4".to_owned(),
        size_bytes: 10_240,
        content_type: "video/mp4".to_owned(),
    }
}

#[rstest]
#[tokio::test]
async fn upload_url_is_issued_for_a_scoped_key(graph: Graph) {
    let mut storage = MockObjectStorage::new();
    storage
        .expect_presign_put()
        .times(1)
        .withf(|_, content_type, ttl| {
            content_type.as_str() == "video/mp4" && *ttl == DEFAULT_URL_TTL
        })
        .returning(|key, _, ttl| {
            Ok(PresignedUrl {
                url: url(&format!("https://s3.test/bucket/{key}")),
                expires_in: ttl,
            })
        });

    let client_id = graph.workout.client_id();
    let assignment_id = graph.assignment.id();
    let service = service(
        workouts_with(Some(graph.workout)),
        assignments_with(graph.assignment),
        MockUploadRepository::new(),
        storage,
    );
    let ticket = service
        .request_upload_url(RequestUploadUrlRequest {
            client_id,
            assignment_id,
            content_type: "video/mp4".to_owned(),
        })
        .await
        .expect("upload url issued");

    assert!(ticket.object_key.is_scoped_to(&client_id, &assignment_id));
    assert!(ticket.url.path().ends_with(ticket.object_key.as_str()));
    assert_eq!(ticket.expires_in, DEFAULT_URL_TTL);
}

#[rstest]
#[tokio::test]
async fn non_video_content_is_rejected_before_any_lookup() {
    let mut assignments = MockAssignmentRepository::new();
    assignments.expect_find_by_id().times(0);
    let service = service(
        MockWorkoutRepository::new(),
        assignments,
        MockUploadRepository::new(),
        MockObjectStorage::new(),
    );

    let err = service
        .request_upload_url(RequestUploadUrlRequest {
            client_id: UserId::random(),
            assignment_id: AssignmentId::random(),
            content_type: "image/png".to_owned(),
        })
        .await
        .expect_err("images are not accepted");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn pending_review_blocks_new_upload_urls(graph: Graph) {
    let Graph {
        workout,
        mut assignment,
    } = graph;
    assignment.attach_upload(UploadId::random(), chrono::Utc::now());
    let client_id = workout.client_id();
    let assignment_id = assignment.id();

    let mut storage = MockObjectStorage::new();
    storage.expect_presign_put().times(0);
    let service = service(
        workouts_with(Some(workout)),
        assignments_with(assignment),
        MockUploadRepository::new(),
        storage,
    );

    let err = service
        .request_upload_url(RequestUploadUrlRequest {
            client_id,
            assignment_id,
            content_type: "video/mp4".to_owned(),
        })
        .await
        .expect_err("submitted assignments are gated");

    assert_eq!(err.code(), ErrorCode::UploadNotAllowed);
}

#[rstest]
#[tokio::test]
async fn other_clients_cannot_request_upload_urls(graph: Graph) {
    let assignment_id = graph.assignment.id();
    let service = service(
        workouts_with(Some(graph.workout)),
        assignments_with(graph.assignment),
        MockUploadRepository::new(),
        MockObjectStorage::new(),
    );

    let err = service
        .request_upload_url(RequestUploadUrlRequest {
            client_id: UserId::random(),
            assignment_id,
            content_type: "video/mp4".to_owned(),
        })
        .await
        .expect_err("foreign client");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn confirmation_links_upload_and_submits(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);
    let trainer_id = graph.workout.trainer_id();

    let mut uploads = MockUploadRepository::new();
    uploads
        .expect_insert()
        .times(1)
        .withf(move |upload| upload.trainer_id() == trainer_id && upload.size_bytes() == 10_240)
        .returning(|_| Ok(()));
    let mut assignments = assignments_with(graph.assignment);
    assignments
        .expect_update()
        .times(1)
        .withf(|assignment| assignment.status() == AssignmentStatus::Submitted)
        .returning(|_| Ok(true));

    let service = service(
        workouts_with(Some(graph.workout)),
        assignments,
        uploads,
        MockObjectStorage::new(),
    );
    let assignment = service
        .confirm_upload(request)
        .await
        .expect("confirmation succeeds");

    assert_eq!(assignment.status(), AssignmentStatus::Submitted);
    assert!(assignment.upload_id().is_some());
}

#[rstest]
#[tokio::test]
async fn keys_issued_for_other_assignments_are_rejected(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &AssignmentId::random(), &mp4());
    let request = confirm_request(&graph, &key);

    let mut uploads = MockUploadRepository::new();
    uploads.expect_insert().times(0);
    let service = service(
        workouts_with(Some(graph.workout)),
        assignments_with(graph.assignment),
        uploads,
        MockObjectStorage::new(),
    );

    let err = service
        .confirm_upload(request)
        .await
        .expect_err("foreign key");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::empty_name("  ", 10_240)]
#[case::empty_file("clip.mp4", 0)]
#[tokio::test]
async fn implausible_metadata_is_rejected(
    graph: Graph,
    #[case] file_name: &str,
    #[case] size_bytes: u64,
) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = ConfirmUploadRequest {
        file_name: file_name.to_owned(),
        size_bytes,
        ..confirm_request(&graph, &key)
    };
    let service = service(
        workouts_with(Some(graph.workout)),
        assignments_with(graph.assignment),
        MockUploadRepository::new(),
        MockObjectStorage::new(),
    );

    let err = service
        .confirm_upload(request)
        .await
        .expect_err("invalid metadata");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn failed_link_compensates_and_reports_confirmation_failure(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let mut uploads = MockUploadRepository::new();
    uploads.expect_insert().times(1).returning(|_| Ok(()));
    uploads.expect_delete().times(1).returning(|_| Ok(true));
    let mut assignments = assignments_with(graph.assignment);
    assignments
        .expect_update()
        .times(1)
        .returning(|_| Err(AssignmentRepositoryError::query("deadlock detected")));
    let expected_key = key.clone();
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .times(1)
        .withf(move |deleted| *deleted == expected_key)
        .returning(|_| Ok(()));

    let service = service(workouts_with(Some(graph.workout)), assignments, uploads, storage);
    let err = service
        .confirm_upload(request)
        .await
        .expect_err("link failure");

    assert_eq!(err.code(), ErrorCode::ConfirmationFailed);
}

#[rstest]
#[tokio::test]
async fn assignment_deleted_mid_confirmation_is_compensated(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let mut uploads = MockUploadRepository::new();
    uploads.expect_insert().times(1).returning(|_| Ok(()));
    uploads.expect_delete().times(1).returning(|_| Ok(true));
    let mut assignments = assignments_with(graph.assignment);
    assignments.expect_update().times(1).returning(|_| Ok(false));
    let mut storage = MockObjectStorage::new();
    storage.expect_delete_object().times(1).returning(|_| Ok(()));

    let service = service(workouts_with(Some(graph.workout)), assignments, uploads, storage);
    let err = service
        .confirm_upload(request)
        .await
        .expect_err("assignment vanished");

    assert_eq!(err.code(), ErrorCode::ConfirmationFailed);
}

fn reviewed_with_upload(graph: &Graph) -> (Assignment, Upload) {
    let previous = upload_for(&graph.assignment, &graph.workout);
    let mut assignment = graph.assignment.clone();
    assignment.attach_upload(previous.id(), Utc::now());
    assignment
        .record_feedback("Go deeper".to_owned(), Some(AssignmentStatus::Reviewed), Utc::now())
        .expect("reviewable");
    (assignment, previous)
}

#[rstest]
#[tokio::test]
async fn resubmission_retires_the_replaced_upload(graph: Graph) {
    let (reviewed, previous) = reviewed_with_upload(&graph);
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let previous_id = previous.id();
    let previous_key = previous.object_key().clone();
    let mut uploads = MockUploadRepository::new();
    uploads.expect_insert().times(1).returning(|_| Ok(()));
    uploads
        .expect_find_by_id()
        .times(1)
        .withf(move |id| *id == previous_id)
        .returning(move |_| Ok(Some(previous.clone())));
    uploads
        .expect_delete()
        .times(1)
        .withf(move |id| *id == previous_id)
        .returning(|_| Ok(true));
    let mut assignments = assignments_with(reviewed);
    assignments.expect_update().times(1).returning(|_| Ok(true));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .times(1)
        .withf(move |deleted| *deleted == previous_key)
        .returning(|_| Ok(()));

    let service = service(workouts_with(Some(graph.workout)), assignments, uploads, storage);
    let assignment = service
        .confirm_upload(request)
        .await
        .expect("re-submission confirmed");

    assert_eq!(assignment.status(), AssignmentStatus::Submitted);
    assert_ne!(assignment.upload_id(), Some(previous_id));
}

#[rstest]
#[tokio::test]
async fn failed_retirement_does_not_fail_the_resubmission(graph: Graph) {
    let (reviewed, previous) = reviewed_with_upload(&graph);
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let mut uploads = MockUploadRepository::new();
    uploads.expect_insert().times(1).returning(|_| Ok(()));
    uploads
        .expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(previous.clone())));
    uploads
        .expect_delete()
        .times(1)
        .returning(|_| Err(UploadRepositoryError::connection("gone")));
    let mut assignments = assignments_with(reviewed);
    assignments.expect_update().times(1).returning(|_| Ok(true));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .times(1)
        .returning(|_| Err(ObjectStorageError::connection("gone")));

    let service = service(workouts_with(Some(graph.workout)), assignments, uploads, storage);
    let assignment = service
        .confirm_upload(request)
        .await
        .expect("re-submission confirmed");

    assert_eq!(assignment.status(), AssignmentStatus::Submitted);
}

#[rstest]
#[tokio::test]
async fn failed_compensation_keeps_the_original_outcome(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let mut uploads = MockUploadRepository::new();
    uploads.expect_insert().times(1).returning(|_| Ok(()));
    uploads
        .expect_delete()
        .times(1)
        .returning(|_| Err(UploadRepositoryError::connection("gone")));
    let mut assignments = assignments_with(graph.assignment);
    assignments
        .expect_update()
        .times(1)
        .returning(|_| Err(AssignmentRepositoryError::connection("gone")));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .times(1)
        .returning(|_| Err(ObjectStorageError::connection("gone")));

    let service = service(workouts_with(Some(graph.workout)), assignments, uploads, storage);
    let err = service
        .confirm_upload(request)
        .await
        .expect_err("link failure");

    assert_eq!(err.code(), ErrorCode::ConfirmationFailed);
}

#[rstest]
#[tokio::test]
async fn failed_insert_needs_no_compensation(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let mut uploads = MockUploadRepository::new();
    uploads
        .expect_insert()
        .times(1)
        .returning(|_| Err(UploadRepositoryError::query("constraint")));
    uploads.expect_delete().times(0);
    let mut assignments = assignments_with(graph.assignment);
    assignments.expect_update().times(0);

    let service = service(
        workouts_with(Some(graph.workout)),
        assignments,
        uploads,
        MockObjectStorage::new(),
    );
    let err = service
        .confirm_upload(request)
        .await
        .expect_err("insert failure");

    assert_eq!(err.code(), ErrorCode::ConfirmationFailed);
}

#[rstest]
#[tokio::test]
async fn confirming_under_a_missing_workout_is_a_consistency_fault(graph: Graph) {
    let key = ObjectKey::issue(&graph.workout.client_id(), &graph.assignment.id(), &mp4());
    let request = confirm_request(&graph, &key);

    let service = service(
        workouts_with(None),
        assignments_with(graph.assignment),
        MockUploadRepository::new(),
        MockObjectStorage::new(),
    );
    let err = service
        .confirm_upload(request)
        .await
        .expect_err("dangling workout");

    assert_eq!(err.code(), ErrorCode::DataConsistencyFault);
}

#[rstest]
#[tokio::test]
async fn compensation_reports_what_it_cleared(graph: Graph) {
    let upload = upload_for(&graph.assignment, &graph.workout);
    let mut uploads = MockUploadRepository::new();
    uploads.expect_delete().times(1).returning(|_| Ok(false));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .times(1)
        .returning(|_| Err(ObjectStorageError::rejected(503_u16, "slow down")));

    let outcome = compensate_orphaned_upload(&uploads, &storage, &upload).await;

    assert_eq!(
        outcome,
        CompensationOutcome {
            record_cleared: true,
            object_cleared: false,
        }
    );
}

#[rstest]
#[tokio::test]
async fn download_without_upload_reports_missing(graph: Graph) {
    let trainer_id = graph.workout.trainer_id();
    let assignment_id = graph.assignment.id();
    let service = service(
        workouts_with(Some(graph.workout)),
        assignments_with(graph.assignment),
        MockUploadRepository::new(),
        MockObjectStorage::new(),
    );

    let err = service
        .download_url(DownloadUrlRequest {
            viewer: Actor::Trainer(trainer_id),
            assignment_id,
        })
        .await
        .expect_err("nothing uploaded");

    assert_eq!(err.code(), ErrorCode::UploadMissing);
}

#[rstest]
#[tokio::test]
async fn download_with_dangling_reference_is_a_consistency_fault(graph: Graph) {
    let Graph {
        workout,
        mut assignment,
    } = graph;
    assignment.attach_upload(UploadId::random(), chrono::Utc::now());
    let client_id = workout.client_id();
    let assignment_id = assignment.id();

    let mut uploads = MockUploadRepository::new();
    uploads.expect_find_by_id().times(1).returning(|_| Ok(None));
    let service = service(
        workouts_with(Some(workout)),
        assignments_with(assignment),
        uploads,
        MockObjectStorage::new(),
    );

    let err = service
        .download_url(DownloadUrlRequest {
            viewer: Actor::Client(client_id),
            assignment_id,
        })
        .await
        .expect_err("dangling upload");

    assert_eq!(err.code(), ErrorCode::DataConsistencyFault);
}

#[rstest]
#[tokio::test]
async fn download_url_targets_the_linked_key(graph: Graph) {
    let Graph {
        workout,
        mut assignment,
    } = graph;
    let upload = upload_for(&assignment, &workout);
    assignment.attach_upload(upload.id(), chrono::Utc::now());
    let trainer_id = workout.trainer_id();
    let assignment_id = assignment.id();
    let expected_key = upload.object_key().clone();

    let mut uploads = MockUploadRepository::new();
    uploads
        .expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(upload.clone())));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_presign_get()
        .times(1)
        .withf(move |key, _| *key == expected_key)
        .returning(|key, ttl| {
            Ok(PresignedUrl {
                url: url(&format!("https://s3.test/bucket/{key}")),
                expires_in: ttl,
            })
        });
    let service = service(
        workouts_with(Some(workout)),
        assignments_with(assignment),
        uploads,
        storage,
    );

    let link = service
        .download_url(DownloadUrlRequest {
            viewer: Actor::Trainer(trainer_id),
            assignment_id,
        })
        .await
        .expect("download url issued");

    assert_eq!(link.expires_in, DEFAULT_URL_TTL);
}
