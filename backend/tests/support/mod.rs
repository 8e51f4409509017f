//! Shared helpers for the service-level integration tests.
//!
//! Each test binary compiles this module separately, so helpers a given
//! binary does not call would otherwise warn.
#![allow(dead_code)]

use fitcoach::domain::ports::{
    AddClientRequest, AssignExerciseRequest, CreateExerciseRequest, CreatePlanRequest,
    CreateWorkoutRequest,
};
use fitcoach::domain::{
    Assignment, AssignmentPlanning, Exercise, ExerciseDetails, ExerciseId, PlanDetails,
    Prescription, TrainingPlan, UploadSettings, User, Workout, WorkoutDetails,
};
use fitcoach::test_support::Harness;

/// A trainer with one linked client, an exercise, a plan and a workout.
pub struct Coaching {
    pub harness: Harness,
    pub trainer: User,
    pub client: User,
    pub exercise: Exercise,
    pub plan: TrainingPlan,
    pub workout: Workout,
}

impl Coaching {
    /// Assign the library exercise to the workout at `sequence`.
    pub async fn assign(&self, sequence: u32) -> Assignment {
        self.harness
            .services
            .assignments
            .assign_exercise(AssignExerciseRequest {
                trainer_id: self.trainer.id(),
                workout_id: self.workout.id(),
                planning: planning(self.exercise.id(), sequence),
            })
            .await
            .expect("exercise assigned")
    }
}

pub fn planning(exercise_id: ExerciseId, sequence: u32) -> AssignmentPlanning {
    AssignmentPlanning {
        exercise_id,
        prescription: Prescription {
            sets: Some(3),
            reps: Some("8-12".to_owned()),
            rest: Some("90s".to_owned()),
            ..Prescription::default()
        },
        trainer_notes: "Slow eccentric".to_owned(),
        sequence,
    }
}

pub fn plan_details(name: &str, is_active: bool) -> PlanDetails {
    PlanDetails {
        name: name.to_owned(),
        description: "Twelve week block".to_owned(),
        is_active,
        ..PlanDetails::default()
    }
}

pub fn workout_details(name: &str, sequence: u32) -> WorkoutDetails {
    WorkoutDetails {
        name: name.to_owned(),
        day_of_week: Some(1),
        notes: String::new(),
        sequence,
    }
}

/// Register a trainer and a client, link them through the roster and build
/// one plan with one workout.
pub async fn coaching() -> Coaching {
    coaching_with(UploadSettings::default()).await
}

pub async fn coaching_with(settings: UploadSettings) -> Coaching {
    let harness = Harness::with_settings(settings);
    let trainer = harness
        .store
        .seed_trainer("Tess Trainer", "tess@example.test")
        .expect("trainer seeded");
    harness
        .store
        .seed_client("Cal Client", "cal@example.test")
        .expect("client seeded");
    let services = &harness.services;

    let client = services
        .roster
        .add_client(AddClientRequest {
            trainer_id: trainer.id(),
            email: "cal@example.test".to_owned(),
        })
        .await
        .expect("client linked");
    let exercise = services
        .exercises
        .create_exercise(CreateExerciseRequest {
            trainer_id: trainer.id(),
            details: ExerciseDetails {
                name: "Goblet squat".to_owned(),
                muscle_group: "legs".to_owned(),
                difficulty: "beginner".to_owned(),
                ..ExerciseDetails::default()
            },
        })
        .await
        .expect("exercise created");
    let plan = services
        .plans
        .create_plan(CreatePlanRequest {
            trainer_id: trainer.id(),
            client_id: client.id(),
            details: plan_details("Strength base", true),
        })
        .await
        .expect("plan created");
    let workout = services
        .workouts
        .create_workout(CreateWorkoutRequest {
            trainer_id: trainer.id(),
            plan_id: plan.id(),
            details: workout_details("Lower body", 0),
        })
        .await
        .expect("workout created");

    Coaching {
        harness,
        trainer,
        client,
        exercise,
        plan,
        workout,
    }
}
