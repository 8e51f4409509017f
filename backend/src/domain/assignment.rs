//! Exercise assignments placed into a workout.
//!
//! An assignment stores no trainer or client id. Both are derived from its
//! workout, which is why every access goes through the ownership chain.

use std::fmt;

use chrono::{DateTime, Utc};

use super::assignment_lifecycle::{
    AssignmentStatus, LifecycleEvent, TransitionError, next_status,
};
use super::{AssignmentId, ExerciseId, UploadId, Workout, WorkoutId};

/// Validation errors returned by [`Assignment::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentValidationError {
    ZeroSets,
    ZeroAchievedSets,
}

impl fmt::Display for AssignmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSets => write!(f, "prescribed sets must be positive"),
            Self::ZeroAchievedSets => write!(f, "achieved sets must be positive"),
        }
    }
}

impl std::error::Error for AssignmentValidationError {}

/// Execution parameters prescribed by the trainer.
///
/// Everything except `sets` is free text so trainers can write ranges such
/// as `8-12` or `90s`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prescription {
    pub sets: Option<u32>,
    pub reps: Option<String>,
    pub rest: Option<String>,
    pub tempo: Option<String>,
    pub weight: Option<String>,
    pub duration: Option<String>,
}

/// Metrics a client reports after doing the work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceLog {
    pub achieved_sets: Option<u32>,
    pub achieved_reps: Option<String>,
    pub achieved_weight: Option<String>,
    pub achieved_duration: Option<String>,
    pub notes: Option<String>,
}

/// Trainer-editable leaf attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlanning {
    pub exercise_id: ExerciseId,
    pub prescription: Prescription,
    pub trainer_notes: String,
    pub sequence: u32,
}

/// Input payload for [`Assignment::new`].
#[derive(Debug, Clone)]
pub struct AssignmentDraft {
    pub id: AssignmentId,
    pub workout_id: WorkoutId,
    pub planning: AssignmentPlanning,
    pub status: AssignmentStatus,
    pub client_notes: String,
    pub performance: PerformanceLog,
    pub upload_id: Option<UploadId>,
    pub feedback: String,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One exercise placed into a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    id: AssignmentId,
    workout_id: WorkoutId,
    exercise_id: ExerciseId,
    prescription: Prescription,
    trainer_notes: String,
    sequence: u32,
    status: AssignmentStatus,
    client_notes: String,
    performance: PerformanceLog,
    upload_id: Option<UploadId>,
    feedback: String,
    assigned_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_prescription(prescription: &Prescription) -> Result<(), AssignmentValidationError> {
    if prescription.sets == Some(0) {
        return Err(AssignmentValidationError::ZeroSets);
    }
    Ok(())
}

fn validate_performance(log: &PerformanceLog) -> Result<(), AssignmentValidationError> {
    if log.achieved_sets == Some(0) {
        return Err(AssignmentValidationError::ZeroAchievedSets);
    }
    Ok(())
}

impl Assignment {
    /// Validate a draft into an assignment.
    pub fn new(draft: AssignmentDraft) -> Result<Self, AssignmentValidationError> {
        let AssignmentDraft {
            id,
            workout_id,
            planning,
            status,
            client_notes,
            performance,
            upload_id,
            feedback,
            assigned_at,
            updated_at,
        } = draft;
        validate_prescription(&planning.prescription)?;
        validate_performance(&performance)?;

        Ok(Self {
            id,
            workout_id,
            exercise_id: planning.exercise_id,
            prescription: planning.prescription,
            trainer_notes: planning.trainer_notes,
            sequence: planning.sequence,
            status,
            client_notes,
            performance,
            upload_id,
            feedback,
            assigned_at,
            updated_at,
        })
    }

    /// Place an exercise into `workout` in the initial `assigned` state.
    pub fn assign(
        workout: &Workout,
        planning: AssignmentPlanning,
        now: DateTime<Utc>,
    ) -> Result<Self, AssignmentValidationError> {
        Self::new(AssignmentDraft {
            id: AssignmentId::random(),
            workout_id: workout.id(),
            planning,
            status: AssignmentStatus::Assigned,
            client_notes: String::new(),
            performance: PerformanceLog::default(),
            upload_id: None,
            feedback: String::new(),
            assigned_at: now,
            updated_at: now,
        })
    }

    /// Replace the trainer-editable attributes. The workout link is kept.
    pub fn replan(
        &mut self,
        planning: AssignmentPlanning,
        now: DateTime<Utc>,
    ) -> Result<(), AssignmentValidationError> {
        validate_prescription(&planning.prescription)?;
        self.exercise_id = planning.exercise_id;
        self.prescription = planning.prescription;
        self.trainer_notes = planning.trainer_notes;
        self.sequence = planning.sequence;
        self.updated_at = now;
        Ok(())
    }

    /// Record trainer feedback, optionally moving to `target`.
    pub fn record_feedback(
        &mut self,
        feedback: String,
        target: Option<AssignmentStatus>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if let Some(target) = target {
            self.status = next_status(self.status, LifecycleEvent::TrainerFeedback { target })?;
        }
        self.feedback = feedback;
        self.updated_at = now;
        Ok(())
    }

    /// Apply a client's explicit status request, keeping any new notes.
    pub fn client_set_status(
        &mut self,
        target: AssignmentStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.status = next_status(self.status, LifecycleEvent::ClientStatusUpdate { target })?;
        if let Some(notes) = notes {
            self.client_notes = notes;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Store achieved metrics; an `assigned` assignment becomes `completed`.
    pub fn log_performance(
        &mut self,
        log: PerformanceLog,
        now: DateTime<Utc>,
    ) -> Result<(), AssignmentValidationError> {
        validate_performance(&log)?;
        self.status =
            next_status(self.status, LifecycleEvent::PerformanceLogged).unwrap_or(self.status);
        self.performance = log;
        self.updated_at = now;
        Ok(())
    }

    /// Link a confirmed upload, replacing any earlier reference.
    pub fn attach_upload(&mut self, upload_id: UploadId, now: DateTime<Utc>) {
        self.status = next_status(self.status, LifecycleEvent::UploadConfirmed)
            .unwrap_or(AssignmentStatus::Submitted);
        self.upload_id = Some(upload_id);
        self.updated_at = now;
    }

    pub fn id(&self) -> AssignmentId {
        self.id
    }

    pub fn workout_id(&self) -> WorkoutId {
        self.workout_id
    }

    pub fn exercise_id(&self) -> ExerciseId {
        self.exercise_id
    }

    pub fn prescription(&self) -> &Prescription {
        &self.prescription
    }

    pub fn trainer_notes(&self) -> &str {
        self.trainer_notes.as_str()
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    pub fn client_notes(&self) -> &str {
        self.client_notes.as_str()
    }

    pub fn performance(&self) -> &PerformanceLog {
        &self.performance
    }

    pub fn upload_id(&self) -> Option<UploadId> {
        self.upload_id
    }

    pub fn feedback(&self) -> &str {
        self.feedback.as_str()
    }

    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Snapshot of the trainer-editable attributes.
    pub fn planning(&self) -> AssignmentPlanning {
        AssignmentPlanning {
            exercise_id: self.exercise_id,
            prescription: self.prescription.clone(),
            trainer_notes: self.trainer_notes.clone(),
            sequence: self.sequence,
        }
    }
}
