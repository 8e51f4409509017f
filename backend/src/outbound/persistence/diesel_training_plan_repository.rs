//! PostgreSQL-backed `TrainingPlanRepository`.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TrainingPlanRepository, TrainingPlanRepositoryError};
use crate::domain::{PlanDetails, PlanId, TrainingPlan, TrainingPlanDraft, UserId};

use super::error_mapping::{invalid_row, map_diesel_error, map_pool_error};
use super::models::{TrainingPlanRow, TrainingPlanWrite};
use super::pool::{DbPool, PoolError};
use super::schema::training_plans;

/// Diesel-backed implementation of the `TrainingPlanRepository` port.
///
/// Deleting a plan relies on the foreign key cascade to remove its workouts,
/// assignments and upload records in the same statement.
#[derive(Clone)]
pub struct DieselTrainingPlanRepository {
    pool: DbPool,
}

impl DieselTrainingPlanRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TrainingPlanRepositoryError {
    map_pool_error(error, TrainingPlanRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TrainingPlanRepositoryError {
    map_diesel_error(
        error,
        TrainingPlanRepositoryError::query,
        TrainingPlanRepositoryError::connection,
    )
}

fn row_to_plan(row: TrainingPlanRow) -> Result<TrainingPlan, TrainingPlanRepositoryError> {
    let id = row.id;
    TrainingPlan::new(TrainingPlanDraft {
        id: PlanId::from_uuid(id),
        trainer_id: UserId::from_uuid(row.trainer_id),
        client_id: UserId::from_uuid(row.client_id),
        details: PlanDetails {
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| TrainingPlanRepositoryError::query(invalid_row("training_plans", id, err)))
}

fn plan_write(plan: &TrainingPlan) -> TrainingPlanWrite<'_> {
    TrainingPlanWrite {
        id: *plan.id().as_uuid(),
        trainer_id: *plan.trainer_id().as_uuid(),
        client_id: *plan.client_id().as_uuid(),
        name: plan.name(),
        description: plan.description(),
        start_date: plan.start_date(),
        end_date: plan.end_date(),
        is_active: plan.is_active(),
        created_at: plan.created_at(),
        updated_at: plan.updated_at(),
    }
}

#[async_trait]
impl TrainingPlanRepository for DieselTrainingPlanRepository {
    async fn find_by_id(
        &self,
        id: &PlanId,
    ) -> Result<Option<TrainingPlan>, TrainingPlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        training_plans::table
            .filter(training_plans::id.eq(id.as_uuid()))
            .select(TrainingPlanRow::as_select())
            .first::<TrainingPlanRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_plan)
            .transpose()
    }

    async fn list_for_pair(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<Vec<TrainingPlan>, TrainingPlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        training_plans::table
            .filter(training_plans::trainer_id.eq(trainer_id.as_uuid()))
            .filter(training_plans::client_id.eq(client_id.as_uuid()))
            .order(training_plans::created_at.desc())
            .select(TrainingPlanRow::as_select())
            .load::<TrainingPlanRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_plan)
            .collect()
    }

    async fn insert(&self, plan: &TrainingPlan) -> Result<(), TrainingPlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(training_plans::table)
            .values(&plan_write(plan))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn update(&self, plan: &TrainingPlan) -> Result<bool, TrainingPlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = training_plans::table.filter(training_plans::id.eq(*plan.id().as_uuid()));
        let updated = diesel::update(target)
            .set(&plan_write(plan))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn deactivate_others(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
        keep: &PlanId,
    ) -> Result<u64, TrainingPlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changed = diesel::update(
            training_plans::table
                .filter(training_plans::trainer_id.eq(trainer_id.as_uuid()))
                .filter(training_plans::client_id.eq(client_id.as_uuid()))
                .filter(training_plans::id.ne(keep.as_uuid()))
                .filter(training_plans::is_active.eq(true)),
        )
        .set((
            training_plans::is_active.eq(false),
            training_plans::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(u64::try_from(changed).unwrap_or_default())
    }

    async fn delete_owned(
        &self,
        id: &PlanId,
        trainer_id: &UserId,
    ) -> Result<bool, TrainingPlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            training_plans::table
                .filter(training_plans::id.eq(id.as_uuid()))
                .filter(training_plans::trainer_id.eq(trainer_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
