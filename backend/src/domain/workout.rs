//! Workouts: ordered sessions within a training plan.
//!
//! # Denormalised ownership
//!
//! A workout carries `trainer_id` and `client_id` copied from its plan when
//! it is created. They are a materialised view of the plan's ownership, kept
//! so that authorization can check a workout without loading its plan.
//!
//! The contract:
//! - The copies are written exactly once, by [`Workout::for_plan`].
//! - Nothing updates them independently. [`Workout::revise`] only touches
//!   leaf attributes, and a workout is never moved to another plan.
//! - Plans never change owner or client, so the copies cannot go stale.
//!
//! Removing these fields in favour of a plan lookup would make every
//! workout and assignment check two reads deep.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{PlanId, TrainingPlan, UserId, WorkoutId};

/// Validation errors returned by [`Workout::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkoutValidationError {
    EmptyName,
    DayOfWeekOutOfRange { value: u8 },
}

impl fmt::Display for WorkoutValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "workout name must not be empty"),
            Self::DayOfWeekOutOfRange { value } => {
                write!(f, "day of week must be between 1 and 7, got {value}")
            }
        }
    }
}

impl std::error::Error for WorkoutValidationError {}

/// Leaf attributes of a workout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutDetails {
    pub name: String,
    /// ISO weekday, Monday = 1.
    pub day_of_week: Option<u8>,
    pub notes: String,
    pub sequence: u32,
}

/// Input payload for [`Workout::new`], used when rehydrating stored rows.
#[derive(Debug, Clone)]
pub struct WorkoutDraft {
    pub id: WorkoutId,
    pub plan_id: PlanId,
    pub trainer_id: UserId,
    pub client_id: UserId,
    pub details: WorkoutDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One session within a training plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    plan_id: PlanId,
    trainer_id: UserId,
    client_id: UserId,
    name: String,
    day_of_week: Option<u8>,
    notes: String,
    sequence: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Workout {
    /// Validate a draft into a workout.
    pub fn new(draft: WorkoutDraft) -> Result<Self, WorkoutValidationError> {
        let WorkoutDraft {
            id,
            plan_id,
            trainer_id,
            client_id,
            details,
            created_at,
            updated_at,
        } = draft;
        let WorkoutDetails {
            name,
            day_of_week,
            notes,
            sequence,
        } = details;

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(WorkoutValidationError::EmptyName);
        }
        if let Some(value) = day_of_week.filter(|day| !(1..=7).contains(day)) {
            return Err(WorkoutValidationError::DayOfWeekOutOfRange { value });
        }

        Ok(Self {
            id,
            plan_id,
            trainer_id,
            client_id,
            name,
            day_of_week,
            notes,
            sequence,
            created_at,
            updated_at,
        })
    }

    /// Create a workout under `plan`, copying the plan's ownership.
    pub fn for_plan(
        plan: &TrainingPlan,
        details: WorkoutDetails,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkoutValidationError> {
        Self::new(WorkoutDraft {
            id: WorkoutId::random(),
            plan_id: plan.id(),
            trainer_id: plan.trainer_id(),
            client_id: plan.client_id(),
            details,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the leaf attributes. Plan and ownership are carried over.
    pub fn revise(
        &self,
        details: WorkoutDetails,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkoutValidationError> {
        Self::new(WorkoutDraft {
            id: self.id,
            plan_id: self.plan_id,
            trainer_id: self.trainer_id,
            client_id: self.client_id,
            details,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    pub fn id(&self) -> WorkoutId {
        self.id
    }

    pub fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// Owning trainer, copied from the plan at creation.
    pub fn trainer_id(&self) -> UserId {
        self.trainer_id
    }

    /// Assigned client, copied from the plan at creation.
    pub fn client_id(&self) -> UserId {
        self.client_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn day_of_week(&self) -> Option<u8> {
        self.day_of_week
    }

    pub fn notes(&self) -> &str {
        self.notes.as_str()
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Current leaf attributes, as accepted by [`Workout::revise`].
    pub fn details(&self) -> WorkoutDetails {
        WorkoutDetails {
            name: self.name.clone(),
            day_of_week: self.day_of_week,
            notes: self.notes.clone(),
            sequence: self.sequence,
        }
    }
}
