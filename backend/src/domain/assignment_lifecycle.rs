//! Assignment status state machine.
//!
//! ```text
//! assigned --upload--> submitted --feedback(reviewed)--> reviewed
//!    ^  \                                                   |
//!    |   +--complete / log--> completed                     |
//!    +-------------------- feedback(assigned) --------------+
//! ```
//!
//! There is no terminal state. Each actor may only request the targets it
//! owns: trainers pick `reviewed` or `assigned` when giving feedback, clients
//! pick `completed`. Upload confirmation always lands on `submitted`, and
//! performance logging only moves `assigned` forward.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Submitted,
    Reviewed,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::Completed => "completed",
        }
    }

    /// Whether a new upload URL may be issued in this state.
    ///
    /// Blocked only while `submitted`, so a pending review is never
    /// overwritten by a fresh upload.
    pub fn permits_upload(&self) -> bool {
        !matches!(self, Self::Submitted)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`AssignmentStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAssignmentStatusError {
    pub input: String,
}

impl fmt::Display for ParseAssignmentStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid assignment status: {}", self.input)
    }
}

impl std::error::Error for ParseAssignmentStatusError {}

impl FromStr for AssignmentStatus {
    type Err = ParseAssignmentStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "assigned" => Ok(Self::Assigned),
            "submitted" => Ok(Self::Submitted),
            "reviewed" => Ok(Self::Reviewed),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseAssignmentStatusError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Something that happened to an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Trainer submitted feedback and asked for a target status.
    TrainerFeedback { target: AssignmentStatus },
    /// Client used the explicit status update.
    ClientStatusUpdate { target: AssignmentStatus },
    /// Client confirmed a video upload.
    UploadConfirmed,
    /// Client logged achieved metrics without a video.
    PerformanceLogged,
}

/// Rejected transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    TrainerTargetNotAllowed { target: AssignmentStatus },
    ClientTargetNotAllowed { target: AssignmentStatus },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrainerTargetNotAllowed { target } => write!(
                f,
                "trainers may only set reviewed or assigned, not {target}"
            ),
            Self::ClientTargetNotAllowed { target } => {
                write!(f, "clients may only set completed, not {target}")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Compute the status after `event`, or reject it.
///
/// Defined for every (status, event) pair.
pub fn next_status(
    current: AssignmentStatus,
    event: LifecycleEvent,
) -> Result<AssignmentStatus, TransitionError> {
    use AssignmentStatus::{Assigned, Completed, Reviewed, Submitted};

    match event {
        LifecycleEvent::TrainerFeedback {
            target: target @ (Reviewed | Assigned),
        } => Ok(target),
        LifecycleEvent::TrainerFeedback { target } => {
            Err(TransitionError::TrainerTargetNotAllowed { target })
        }
        LifecycleEvent::ClientStatusUpdate { target: Completed } => Ok(Completed),
        LifecycleEvent::ClientStatusUpdate { target } => {
            Err(TransitionError::ClientTargetNotAllowed { target })
        }
        LifecycleEvent::UploadConfirmed => Ok(Submitted),
        LifecycleEvent::PerformanceLogged => Ok(match current {
            Assigned => Completed,
            other => other,
        }),
    }
}
