//! Strongly typed entity identifiers.
//!
//! Every persisted entity is keyed by a UUID. Wrapping each key in its own
//! newtype keeps a workout id from being passed where a plan id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Parse error shared by all identifier newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    pub kind: &'static str,
    pub input: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} id: {}", self.kind, self.input)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! define_id {
    ($(#[$outer:meta])* $name:ident => $kind:literal) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| ParseIdError {
                        kind: $kind,
                        input: value.to_owned(),
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a trainer or client account.
    UserId => "user"
);
define_id!(
    /// Identifier of an exercise in a trainer's library.
    ExerciseId => "exercise"
);
define_id!(
    /// Identifier of a training plan.
    PlanId => "plan"
);
define_id!(
    /// Identifier of a workout within a plan.
    WorkoutId => "workout"
);
define_id!(
    /// Identifier of an exercise assignment within a workout.
    AssignmentId => "assignment"
);
define_id!(
    /// Identifier of an upload metadata record.
    UploadId => "upload"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_surrounding_whitespace() {
        let raw = Uuid::new_v4();
        let parsed: PlanId = format!(" {raw} ").parse().expect("valid id");
        assert_eq!(parsed.as_uuid(), &raw);
    }

    #[rstest]
    fn parse_error_names_the_kind() {
        let err = "nope".parse::<WorkoutId>().expect_err("invalid id");
        assert_eq!(err.to_string(), "invalid workout id: nope");
    }

    #[rstest]
    fn serialises_as_bare_uuid() {
        let id = AssignmentId::random();
        let value = serde_json::to_value(id).expect("id serialises");
        assert_eq!(value, serde_json::json!(id.as_uuid().to_string()));
    }
}
