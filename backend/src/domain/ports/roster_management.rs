//! Driving port for linking clients to trainers.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Request to take on an existing client account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddClientRequest {
    pub trainer_id: UserId,
    /// Matched case-insensitively.
    pub email: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterManagement: Send + Sync {
    /// Link the client with `email` to the trainer and return it.
    ///
    /// Linking a client the trainer already manages succeeds and repairs a
    /// missing trainer-side link. A client of another trainer is a conflict
    /// with reason `already_assigned`; a trainer account is rejected with
    /// reason `wrong_role`.
    async fn add_client(&self, request: AddClientRequest) -> Result<User, Error>;

    /// Clients the trainer manages.
    async fn list_clients(&self, trainer_id: UserId) -> Result<Vec<User>, Error>;
}
