//! Entity builders shared by domain unit tests.

use chrono::Utc;

use super::{
    Assignment, AssignmentPlanning, EmailAddress, Exercise, ExerciseDetails, ExerciseDraft,
    ExerciseId, ObjectKey, PlanDetails, PlanId, Prescription, TrainingPlan, TrainingPlanDraft,
    Upload, UploadDraft, UploadId, User, UserDraft, UserId, UserRole, VideoContentType, Workout,
    WorkoutDetails,
};

pub(crate) fn user(role: UserRole, trainer_id: Option<UserId>, client_ids: Vec<UserId>) -> User {
    let id = UserId::random();
    let now = Utc::now();
    User::new(UserDraft {
        id,
        name: format!("{role} {id}"),
        email: EmailAddress::new(format!("{id}@example.com")).expect("valid email"),
        role,
        trainer_id,
        client_ids,
        created_at: now,
        updated_at: now,
    })
    .expect("valid user")
}

pub(crate) fn plan_for(trainer_id: UserId, client_id: UserId) -> TrainingPlan {
    let now = Utc::now();
    TrainingPlan::new(TrainingPlanDraft {
        id: PlanId::random(),
        trainer_id,
        client_id,
        details: PlanDetails {
            name: "Hypertrophy block".to_owned(),
            ..PlanDetails::default()
        },
        created_at: now,
        updated_at: now,
    })
    .expect("valid plan")
}

pub(crate) fn workout_in(plan: &TrainingPlan) -> Workout {
    Workout::for_plan(
        plan,
        WorkoutDetails {
            name: "Lower body".to_owned(),
            day_of_week: Some(1),
            ..WorkoutDetails::default()
        },
        Utc::now(),
    )
    .expect("valid workout")
}

pub(crate) fn planning(exercise_id: ExerciseId, sequence: u32) -> AssignmentPlanning {
    AssignmentPlanning {
        exercise_id,
        prescription: Prescription {
            sets: Some(3),
            reps: Some("10".to_owned()),
            ..Prescription::default()
        },
        trainer_notes: String::new(),
        sequence,
    }
}

pub(crate) fn assignment_in(workout: &Workout) -> Assignment {
    Assignment::assign(workout, planning(ExerciseId::random(), 0), Utc::now())
        .expect("valid assignment")
}

pub(crate) fn exercise_for(trainer_id: UserId) -> Exercise {
    let now = Utc::now();
    Exercise::new(ExerciseDraft {
        id: ExerciseId::random(),
        trainer_id,
        details: ExerciseDetails {
            name: "Back squat".to_owned(),
            ..ExerciseDetails::default()
        },
        created_at: now,
        updated_at: now,
    })
    .expect("valid exercise")
}

pub(crate) fn mp4() -> VideoContentType {
    VideoContentType::parse("video/mp4").expect("video type")
}

pub(crate) fn upload_for(assignment: &Assignment, workout: &Workout) -> Upload {
    let key = ObjectKey::issue(&workout.client_id(), &assignment.id(), &mp4());
    Upload::new(UploadDraft {
        id: UploadId::random(),
        assignment_id: assignment.id(),
        client_id: workout.client_id(),
        trainer_id: workout.trainer_id(),
        object_key: key,
        file_name: "clip.mp4".to_owned(),
        content_type: mp4(),
        size_bytes: 10_240,
        uploaded_at: Utc::now(),
    })
    .expect("valid upload")
}
