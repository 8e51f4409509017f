//! Training plans a trainer defines for one managed client.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{PlanId, UserId};

/// Validation errors returned by [`TrainingPlan::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingPlanValidationError {
    EmptyName,
    EndBeforeStart,
}

impl fmt::Display for TrainingPlanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "plan name must not be empty"),
            Self::EndBeforeStart => write!(f, "plan end date must not precede its start date"),
        }
    }
}

impl std::error::Error for TrainingPlanValidationError {}

/// Leaf attributes of a plan. Ownership is not part of this payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDetails {
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Input payload for [`TrainingPlan::new`].
#[derive(Debug, Clone)]
pub struct TrainingPlanDraft {
    pub id: PlanId,
    pub trainer_id: UserId,
    pub client_id: UserId,
    pub details: PlanDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plan owned by one trainer and assigned to one client.
///
/// At most one plan should be active per (trainer, client) pair. This is a
/// policy the plan service maintains by deactivating siblings, not a storage
/// constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPlan {
    id: PlanId,
    trainer_id: UserId,
    client_id: UserId,
    name: String,
    description: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrainingPlan {
    /// Validate a draft into a plan.
    pub fn new(draft: TrainingPlanDraft) -> Result<Self, TrainingPlanValidationError> {
        let TrainingPlanDraft {
            id,
            trainer_id,
            client_id,
            details,
            created_at,
            updated_at,
        } = draft;
        let PlanDetails {
            name,
            description,
            start_date,
            end_date,
            is_active,
        } = details;

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(TrainingPlanValidationError::EmptyName);
        }
        if matches!((start_date, end_date), (Some(start), Some(end)) if end < start) {
            return Err(TrainingPlanValidationError::EndBeforeStart);
        }

        Ok(Self {
            id,
            trainer_id,
            client_id,
            name,
            description,
            start_date,
            end_date,
            is_active,
            created_at,
            updated_at,
        })
    }

    /// Replace the leaf attributes, keeping identity and parentage.
    pub fn revise(
        &self,
        details: PlanDetails,
        now: DateTime<Utc>,
    ) -> Result<Self, TrainingPlanValidationError> {
        Self::new(TrainingPlanDraft {
            id: self.id,
            trainer_id: self.trainer_id,
            client_id: self.client_id,
            details,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    pub fn id(&self) -> PlanId {
        self.id
    }

    pub fn trainer_id(&self) -> UserId {
        self.trainer_id
    }

    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Snapshot of the leaf attributes.
    pub fn details(&self) -> PlanDetails {
        PlanDetails {
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
        }
    }
}
