//! Roster service keeping trainer and client links in step.
//!
//! A link is written twice: into the trainer's client set, then onto the
//! client. The store cannot write both atomically, so a failed second write
//! is compensated by removing the first.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use super::ports::{AddClientRequest, RosterManagement, UserRepository};
use super::{EmailAddress, Error, User, UserId, UserRole};

/// Implements [`RosterManagement`] over a user repository.
#[derive(Clone)]
pub struct RosterService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl RosterService {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    async fn load_trainer(&self, trainer_id: &UserId) -> Result<User, Error> {
        let trainer = self
            .users
            .find_by_id(trainer_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("trainer {trainer_id} not found")))?;
        if trainer.role() != UserRole::Trainer {
            return Err(Error::forbidden("only trainers manage clients"));
        }
        Ok(trainer)
    }

    async fn link(&self, trainer: &User, client: User) -> Result<User, Error> {
        let trainer_id = trainer.id();
        let client_id = client.id();

        self.users.add_client_link(&trainer_id, &client_id).await?;
        if let Err(err) = self.users.set_trainer(&client_id, &trainer_id).await {
            if let Err(undo) = self.users.remove_client_link(&trainer_id, &client_id).await {
                error!(
                    trainer_id = %trainer_id,
                    client_id = %client_id,
                    error = %undo,
                    "failed to remove half-written client link"
                );
            }
            return Err(err.into());
        }

        info!(trainer_id = %trainer_id, client_id = %client_id, "client linked to trainer");
        Ok(client.with_trainer(trainer_id, self.clock.utc()))
    }
}

#[async_trait]
impl RosterManagement for RosterService {
    async fn add_client(&self, request: AddClientRequest) -> Result<User, Error> {
        let trainer = self.load_trainer(&request.trainer_id).await?;
        let email = EmailAddress::new(&request.email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let client = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found(format!("no account registered for {email}")))?;
        if client.role() != UserRole::Client {
            return Err(
                Error::invalid_request(format!("{email} is not a client account"))
                    .with_reason("wrong_role"),
            );
        }

        match client.trainer_id() {
            Some(current) if current == trainer.id() => {
                if !trainer.manages(&client.id()) {
                    self.users
                        .add_client_link(&trainer.id(), &client.id())
                        .await?;
                }
                Ok(client)
            }
            Some(_) => Err(
                Error::conflict(format!("{email} already has a trainer"))
                    .with_reason("already_assigned"),
            ),
            None => self.link(&trainer, client).await,
        }
    }

    async fn list_clients(&self, trainer_id: UserId) -> Result<Vec<User>, Error> {
        let trainer = self.load_trainer(&trainer_id).await?;
        Ok(self.users.list_clients(&trainer.id()).await?)
    }
}

#[cfg(test)]
#[path = "roster_service_tests.rs"]
mod tests;
