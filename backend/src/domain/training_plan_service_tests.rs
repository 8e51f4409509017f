//! Tests for the training plan service.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockAssignmentRepository, MockObjectStorage, MockTrainingPlanRepository,
    MockUploadRepository, MockUserRepository, MockWorkoutRepository, TrainingPlanRepositoryError,
};
use crate::domain::test_entities::{plan_for, user};
use crate::domain::{ErrorCode, PlanDetails, User};

fn service(users: MockUserRepository, plans: MockTrainingPlanRepository) -> TrainingPlanService {
    let plans: Arc<dyn TrainingPlanRepository> = Arc::new(plans);
    let workouts = Arc::new(MockWorkoutRepository::new());
    let assignments = Arc::new(MockAssignmentRepository::new());
    let chain = OwnershipChain::new(Arc::clone(&plans), workouts.clone(), assignments.clone());
    let sweeper = CascadeSweeper::new(
        workouts,
        assignments,
        Arc::new(MockUploadRepository::new()),
        Arc::new(MockObjectStorage::new()),
    );
    TrainingPlanService::new(Arc::new(users), plans, chain, sweeper, Arc::new(DefaultClock))
}

fn users_returning(found: Option<User>) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(found.clone()));
    users
}

fn details(active: bool) -> PlanDetails {
    PlanDetails {
        name: "Base block".to_owned(),
        is_active: active,
        ..PlanDetails::default()
    }
}

#[rstest]
#[tokio::test]
async fn active_plan_deactivates_its_siblings() {
    let trainer_id = UserId::random();
    let client = user(UserRole::Client, Some(trainer_id), Vec::new());
    let client_id = client.id();

    let mut plans = MockTrainingPlanRepository::new();
    plans.expect_insert().times(1).returning(|_| Ok(()));
    plans
        .expect_deactivate_others()
        .withf(move |t, c, _| *t == trainer_id && *c == client_id)
        .times(1)
        .returning(|_, _, _| Ok(2));

    let plan = service(users_returning(Some(client)), plans)
        .create_plan(CreatePlanRequest {
            trainer_id,
            client_id,
            details: details(true),
        })
        .await
        .expect("plan created");

    assert!(plan.is_active());
    assert_eq!(plan.client_id(), client_id);
}

#[rstest]
#[tokio::test]
async fn stored_plan_is_returned_when_deactivation_fails() {
    let trainer_id = UserId::random();
    let client = user(UserRole::Client, Some(trainer_id), Vec::new());
    let client_id = client.id();

    let mut plans = MockTrainingPlanRepository::new();
    plans.expect_insert().times(1).returning(|_| Ok(()));
    plans
        .expect_deactivate_others()
        .times(1)
        .returning(|_, _, _| Err(TrainingPlanRepositoryError::connection("pool closed")));

    let plan = service(users_returning(Some(client)), plans)
        .create_plan(CreatePlanRequest {
            trainer_id,
            client_id,
            details: details(true),
        })
        .await
        .expect("the plan write stands");

    assert!(plan.is_active());
}

#[rstest]
#[tokio::test]
async fn inactive_plan_leaves_siblings_alone() {
    let trainer_id = UserId::random();
    let client = user(UserRole::Client, Some(trainer_id), Vec::new());
    let client_id = client.id();

    let mut plans = MockTrainingPlanRepository::new();
    plans.expect_insert().times(1).returning(|_| Ok(()));
    plans.expect_deactivate_others().times(0);

    service(users_returning(Some(client)), plans)
        .create_plan(CreatePlanRequest {
            trainer_id,
            client_id,
            details: details(false),
        })
        .await
        .expect("plan created");
}

#[rstest]
#[case::unmanaged(
    Some(user(UserRole::Client, Some(UserId::random()), Vec::new())),
    ErrorCode::Forbidden
)]
#[case::unassigned(Some(user(UserRole::Client, None, Vec::new())), ErrorCode::Forbidden)]
#[case::not_a_client(Some(user(UserRole::Trainer, None, Vec::new())), ErrorCode::NotFound)]
#[case::missing(None, ErrorCode::NotFound)]
#[tokio::test]
async fn plans_require_a_managed_client(
    #[case] found: Option<User>,
    #[case] expected: ErrorCode,
) {
    let mut plans = MockTrainingPlanRepository::new();
    plans.expect_insert().times(0);

    let err = service(users_returning(found), plans)
        .create_plan(CreatePlanRequest {
            trainer_id: UserId::random(),
            client_id: UserId::random(),
            details: details(false),
        })
        .await
        .expect_err("client check fails");

    assert_eq!(err.code(), expected);
    if expected == ErrorCode::Forbidden {
        assert_eq!(err.reason(), Some("client_not_managed"));
    }
}

#[rstest]
#[tokio::test]
async fn moving_a_plan_to_another_client_is_rejected() {
    let trainer_id = UserId::random();
    let plan = plan_for(trainer_id, UserId::random());
    let plan_id = plan.id();

    let mut plans = MockTrainingPlanRepository::new();
    plans
        .expect_find_by_id()
        .returning(move |_| Ok(Some(plan.clone())));
    plans.expect_update().times(0);

    let err = service(MockUserRepository::new(), plans)
        .update_plan(UpdatePlanRequest {
            trainer_id,
            plan_id,
            client_id: Some(UserId::random()),
            details: details(false),
        })
        .await
        .expect_err("parentage is fixed");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.reason(), Some("parent_mismatch"));
}

#[rstest]
#[tokio::test]
async fn update_keeps_parentage_and_activates() {
    let trainer_id = UserId::random();
    let plan = plan_for(trainer_id, UserId::random());
    let (plan_id, client_id) = (plan.id(), plan.client_id());

    let mut plans = MockTrainingPlanRepository::new();
    plans
        .expect_find_by_id()
        .returning(move |_| Ok(Some(plan.clone())));
    plans.expect_update().times(1).returning(|_| Ok(true));
    plans
        .expect_deactivate_others()
        .withf(move |_, _, keep| *keep == plan_id)
        .times(1)
        .returning(|_, _, _| Ok(1));

    let revised = service(MockUserRepository::new(), plans)
        .update_plan(UpdatePlanRequest {
            trainer_id,
            plan_id,
            client_id: Some(client_id),
            details: details(true),
        })
        .await
        .expect("update succeeds");

    assert_eq!(revised.id(), plan_id);
    assert_eq!(revised.client_id(), client_id);
    assert!(revised.is_active());
}

#[rstest]
#[tokio::test]
async fn plan_deleted_before_the_update_lands_is_not_found() {
    let trainer_id = UserId::random();
    let plan = plan_for(trainer_id, UserId::random());
    let plan_id = plan.id();

    let mut plans = MockTrainingPlanRepository::new();
    plans
        .expect_find_by_id()
        .returning(move |_| Ok(Some(plan.clone())));
    plans.expect_update().times(1).returning(|_| Ok(false));
    plans.expect_deactivate_others().times(0);

    let err = service(MockUserRepository::new(), plans)
        .update_plan(UpdatePlanRequest {
            trainer_id,
            plan_id,
            client_id: None,
            details: details(true),
        })
        .await
        .expect_err("row is gone");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn foreign_trainer_cannot_delete() {
    let plan = plan_for(UserId::random(), UserId::random());
    let plan_id = plan.id();

    let mut plans = MockTrainingPlanRepository::new();
    plans
        .expect_find_by_id()
        .returning(move |_| Ok(Some(plan.clone())));
    plans.expect_delete_owned().times(0);

    let err = service(MockUserRepository::new(), plans)
        .delete_plan(UserId::random(), plan_id)
        .await
        .expect_err("not the owner");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}
