//! Port abstraction for user persistence and roster links.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::{define_port_error, persistence_error_into_domain};

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

persistence_error_into_domain!(UserRepositoryError => "user repository");

/// Reads and writes accounts plus the trainer/client links between them.
///
/// The two link directions are written by separate calls. Keeping them
/// consistent is the roster service's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user, including its client set when it is a trainer.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by normalised email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Insert or update identity attributes. Links are not touched.
    async fn save(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Add `client_id` to the trainer's client set. Adding twice is a no-op.
    async fn add_client_link(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), UserRepositoryError>;

    /// Remove `client_id` from the trainer's client set.
    async fn remove_client_link(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), UserRepositoryError>;

    /// Point the client at its trainer.
    async fn set_trainer(
        &self,
        client_id: &UserId,
        trainer_id: &UserId,
    ) -> Result<(), UserRepositoryError>;

    /// Clients listed in the trainer's client set.
    async fn list_clients(&self, trainer_id: &UserId) -> Result<Vec<User>, UserRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn add_client_link(
        &self,
        _trainer_id: &UserId,
        _client_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn remove_client_link(
        &self,
        _trainer_id: &UserId,
        _client_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn set_trainer(
        &self,
        _client_id: &UserId,
        _trainer_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn list_clients(&self, _trainer_id: &UserId) -> Result<Vec<User>, UserRepositoryError> {
        Ok(Vec::new())
    }
}
