//! Exercises in a trainer's library.

use std::fmt;

use chrono::{DateTime, Utc};
use url::Url;

use super::{ExerciseId, UserId};

/// Validation errors returned by [`Exercise::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseValidationError {
    EmptyName,
    InvalidVideoUrl { input: String },
}

impl fmt::Display for ExerciseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "exercise name must not be empty"),
            Self::InvalidVideoUrl { input } => {
                write!(f, "exercise video url is not an absolute url: {input}")
            }
        }
    }
}

impl std::error::Error for ExerciseValidationError {}

/// Descriptive exercise fields a trainer may edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseDetails {
    pub name: String,
    pub description: String,
    pub muscle_group: String,
    pub execution_technique: String,
    pub applicability: String,
    pub difficulty: String,
    /// Optional demonstration video.
    pub video_url: Option<String>,
}

/// Input payload for [`Exercise::new`].
#[derive(Debug, Clone)]
pub struct ExerciseDraft {
    pub id: ExerciseId,
    pub trainer_id: UserId,
    pub details: ExerciseDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exercise owned by one trainer.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    id: ExerciseId,
    trainer_id: UserId,
    name: String,
    description: String,
    muscle_group: String,
    execution_technique: String,
    applicability: String,
    difficulty: String,
    video_url: Option<Url>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_video_url(raw: Option<String>) -> Result<Option<Url>, ExerciseValidationError> {
    match raw.map(|value| value.trim().to_owned()) {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => Url::parse(&value)
            .map(Some)
            .map_err(|_| ExerciseValidationError::InvalidVideoUrl { input: value }),
    }
}

impl Exercise {
    /// Validate a draft into an exercise.
    pub fn new(draft: ExerciseDraft) -> Result<Self, ExerciseValidationError> {
        let ExerciseDraft {
            id,
            trainer_id,
            details,
            created_at,
            updated_at,
        } = draft;
        let ExerciseDetails {
            name,
            description,
            muscle_group,
            execution_technique,
            applicability,
            difficulty,
            video_url,
        } = details;

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(ExerciseValidationError::EmptyName);
        }

        Ok(Self {
            id,
            trainer_id,
            name,
            description,
            muscle_group,
            execution_technique,
            applicability,
            difficulty,
            video_url: parse_video_url(video_url)?,
            created_at,
            updated_at,
        })
    }

    /// Replace the descriptive fields, keeping identity and ownership.
    pub fn revise(
        &self,
        details: ExerciseDetails,
        now: DateTime<Utc>,
    ) -> Result<Self, ExerciseValidationError> {
        Self::new(ExerciseDraft {
            id: self.id,
            trainer_id: self.trainer_id,
            details,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ExerciseId {
        self.id
    }

    pub fn trainer_id(&self) -> UserId {
        self.trainer_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn muscle_group(&self) -> &str {
        self.muscle_group.as_str()
    }

    pub fn execution_technique(&self) -> &str {
        self.execution_technique.as_str()
    }

    pub fn applicability(&self) -> &str {
        self.applicability.as_str()
    }

    pub fn difficulty(&self) -> &str {
        self.difficulty.as_str()
    }

    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when `trainer_id` owns this exercise.
    pub fn is_owned_by(&self, trainer_id: &UserId) -> bool {
        &self.trainer_id == trainer_id
    }
}
