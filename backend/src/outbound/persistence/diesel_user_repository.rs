//! PostgreSQL-backed `UserRepository`.
//!
//! The roster is stored twice: `users.trainer_id` on the client side and a
//! `trainer_clients` row on the trainer side. The unique `client_id` column
//! makes the database reject a second trainer for the same client.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{EmailAddress, User, UserDraft, UserId, UserRole};

use super::error_mapping::{invalid_row, map_diesel_error, map_pool_error};
use super::models::{NewTrainerClientRow, UserRow, UserWrite};
use super::pool::{DbPool, PoolError};
use super::schema::{trainer_clients, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: UserRow) -> Result<User, UserRepositoryError> {
        let client_ids = if row.role == UserRole::Trainer.as_str() {
            let mut conn = self.pool.get().await.map_err(pool_error)?;
            trainer_clients::table
                .filter(trainer_clients::trainer_id.eq(row.id))
                .order(trainer_clients::created_at.asc())
                .select(trainer_clients::client_id)
                .load::<Uuid>(&mut conn)
                .await
                .map_err(diesel_error)?
        } else {
            Vec::new()
        };
        row_to_user(row, client_ids)
    }

    async fn hydrate_optional(
        &self,
        row: Option<UserRow>,
    ) -> Result<Option<User>, UserRepositoryError> {
        match row {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn row_to_user(row: UserRow, client_ids: Vec<Uuid>) -> Result<User, UserRepositoryError> {
    let id = row.id;
    let invalid = |reason: String| UserRepositoryError::query(invalid_row("users", id, reason));
    let role: UserRole = row.role.parse().map_err(|err| invalid(format!("{err}")))?;
    let email = EmailAddress::new(&row.email).map_err(|err| invalid(err.to_string()))?;

    User::new(UserDraft {
        id: UserId::from_uuid(id),
        name: row.name,
        email,
        role,
        trainer_id: row.trainer_id.map(UserId::from_uuid),
        client_ids: client_ids.into_iter().map(UserId::from_uuid).collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| invalid(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let row = {
            let mut conn = self.pool.get().await.map_err(pool_error)?;
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .await
                .optional()
                .map_err(diesel_error)?
        };
        self.hydrate_optional(row).await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let row = {
            let mut conn = self.pool.get().await.map_err(pool_error)?;
            users::table
                .filter(users::email.eq(email.as_str()))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .await
                .optional()
                .map_err(diesel_error)?
        };
        self.hydrate_optional(row).await
    }

    async fn save(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = UserWrite {
            id: *user.id().as_uuid(),
            name: user.name(),
            email: user.email().as_str(),
            role: user.role().as_str(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn add_client_link(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewTrainerClientRow {
            trainer_id: *trainer_id.as_uuid(),
            client_id: *client_id.as_uuid(),
        };

        // Only the exact pair is idempotent; a different trainer trips the
        // unique client_id constraint.
        diesel::insert_into(trainer_clients::table)
            .values(&row)
            .on_conflict((trainer_clients::trainer_id, trainer_clients::client_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn remove_client_link(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(
            trainer_clients::table
                .filter(trainer_clients::trainer_id.eq(trainer_id.as_uuid()))
                .filter(trainer_clients::client_id.eq(client_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(diesel_error)
    }

    async fn set_trainer(
        &self,
        client_id: &UserId,
        trainer_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(client_id.as_uuid())))
            .set((
                users::trainer_id.eq(Some(*trainer_id.as_uuid())),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;

        if updated == 0 {
            return Err(UserRepositoryError::query(format!(
                "client {client_id} disappeared before its trainer was set"
            )));
        }
        Ok(())
    }

    async fn list_clients(&self, trainer_id: &UserId) -> Result<Vec<User>, UserRepositoryError> {
        let rows = {
            let mut conn = self.pool.get().await.map_err(pool_error)?;
            trainer_clients::table
                .inner_join(users::table)
                .filter(trainer_clients::trainer_id.eq(trainer_id.as_uuid()))
                .order(users::name.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(&mut conn)
                .await
                .map_err(diesel_error)?
        };

        rows.into_iter()
            .map(|row| row_to_user(row, Vec::new()))
            .collect()
    }
}
