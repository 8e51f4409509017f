//! In-memory entity store implementing every repository port.
//!
//! The store mirrors the PostgreSQL schema closely enough for service-level
//! tests: deletes cascade plan → workout → assignment → upload, inserts
//! check their parent row, updates never recreate a deleted row, a client
//! can be linked to one trainer only, and updating a workout never rewrites
//! its copied owners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use mockable::Clock;

use crate::domain::ports::{
    AssignmentRepository, AssignmentRepositoryError, ExerciseRepository, ExerciseRepositoryError,
    ObjectStorage, TrainingPlanRepository, TrainingPlanRepositoryError, UploadRepository,
    UploadRepositoryError, UserRepository, UserRepositoryError, WorkoutRepository,
    WorkoutRepositoryError,
};
use crate::domain::{
    Assignment, AssignmentId, EmailAddress, Exercise, ExerciseId, PlanDetails, PlanId,
    TrainingPlan, Upload, UploadId, User, UserDraft, UserId, UserRole, UserValidationError,
    Workout, WorkoutDraft, WorkoutId,
};
use crate::wiring::DrivenPorts;

use super::failures::{Fault, FailureSwitch};

macro_rules! fault_into {
    ($name:ident => $error:ident) => {
        fn $name(fault: Fault, message: String) -> $error {
            match fault {
                Fault::Unavailable => $error::connection(message),
                Fault::Rejected => $error::query(message),
            }
        }
    };
}

fault_into!(user_fault => UserRepositoryError);
fault_into!(exercise_fault => ExerciseRepositoryError);
fault_into!(plan_fault => TrainingPlanRepositoryError);
fault_into!(workout_fault => WorkoutRepositoryError);
fault_into!(assignment_fault => AssignmentRepositoryError);
fault_into!(upload_fault => UploadRepositoryError);

#[derive(Debug, Default)]
struct State {
    /// Identity attributes only; links live in the two maps below.
    users: HashMap<UserId, User>,
    trainer_of: HashMap<UserId, UserId>,
    clients_of: HashMap<UserId, Vec<UserId>>,
    exercises: HashMap<ExerciseId, Exercise>,
    plans: HashMap<PlanId, TrainingPlan>,
    workouts: HashMap<WorkoutId, Workout>,
    assignments: HashMap<AssignmentId, Assignment>,
    uploads: HashMap<UploadId, Upload>,
}

impl State {
    fn hydrate(&self, user: &User) -> Result<User, UserValidationError> {
        let (trainer_id, client_ids) = match user.role() {
            UserRole::Trainer => (
                None,
                self.clients_of.get(&user.id()).cloned().unwrap_or_default(),
            ),
            UserRole::Client => (self.trainer_of.get(&user.id()).copied(), Vec::new()),
        };
        User::new(UserDraft {
            id: user.id(),
            name: user.name().to_owned(),
            email: user.email().clone(),
            role: user.role(),
            trainer_id,
            client_ids,
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        })
    }

    fn remove_plan(&mut self, id: &PlanId) -> bool {
        let removed = self.plans.remove(id).is_some();
        let children: Vec<WorkoutId> = self
            .workouts
            .values()
            .filter(|workout| workout.plan_id() == *id)
            .map(Workout::id)
            .collect();
        for child in children {
            self.remove_workout(&child);
        }
        removed
    }

    fn remove_workout(&mut self, id: &WorkoutId) -> bool {
        let removed = self.workouts.remove(id).is_some();
        let children: Vec<AssignmentId> = self
            .assignments
            .values()
            .filter(|assignment| assignment.workout_id() == *id)
            .map(Assignment::id)
            .collect();
        for child in children {
            self.remove_assignment(&child);
        }
        removed
    }

    fn remove_assignment(&mut self, id: &AssignmentId) -> bool {
        let removed = self.assignments.remove(id).is_some();
        self.uploads.retain(|_, upload| upload.assignment_id() != *id);
        removed
    }
}

/// Row counts per table, for cascade assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    pub plans: usize,
    pub workouts: usize,
    pub assignments: usize,
    pub uploads: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    failures: Arc<FailureSwitch>,
}

impl InMemoryStore {
    pub fn new(failures: Arc<FailureSwitch>) -> Self {
        Self {
            state: Mutex::default(),
            failures,
        }
    }

    pub fn failures(&self) -> &FailureSwitch {
        &self.failures
    }

    /// Bundle the store with a storage gateway and clock as driven ports.
    pub fn ports(
        self: &Arc<Self>,
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
    ) -> DrivenPorts {
        DrivenPorts {
            users: Arc::clone(self) as Arc<dyn UserRepository>,
            exercises: Arc::clone(self) as Arc<dyn ExerciseRepository>,
            plans: Arc::clone(self) as Arc<dyn TrainingPlanRepository>,
            workouts: Arc::clone(self) as Arc<dyn WorkoutRepository>,
            assignments: Arc::clone(self) as Arc<dyn AssignmentRepository>,
            uploads: Arc::clone(self) as Arc<dyn UploadRepository>,
            storage,
            clock,
        }
    }

    /// Store a user together with whatever links it carries.
    pub fn seed_user(&self, user: User) {
        let mut state = self.lock();
        if let Some(trainer_id) = user.trainer_id() {
            state.trainer_of.insert(user.id(), trainer_id);
        }
        for client_id in user.client_ids() {
            state.trainer_of.insert(*client_id, user.id());
        }
        if !user.client_ids().is_empty() {
            state
                .clients_of
                .insert(user.id(), user.client_ids().to_vec());
        }
        state.users.insert(user.id(), user);
    }

    pub fn seed_trainer(&self, name: &str, email: &str) -> Result<User, UserValidationError> {
        self.seed_account(name, email, UserRole::Trainer)
    }

    pub fn seed_client(&self, name: &str, email: &str) -> Result<User, UserValidationError> {
        self.seed_account(name, email, UserRole::Client)
    }

    fn seed_account(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, UserValidationError> {
        let now = Utc::now();
        let user = User::new(UserDraft {
            id: UserId::random(),
            name: name.to_owned(),
            email: EmailAddress::new(email)?,
            role,
            trainer_id: None,
            client_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        })?;
        self.seed_user(user.clone());
        Ok(user)
    }

    pub fn counts(&self) -> StoreCounts {
        let state = self.lock();
        StoreCounts {
            plans: state.plans.len(),
            workouts: state.workouts.len(),
            assignments: state.assignments.len(),
            uploads: state.uploads.len(),
        }
    }

    pub fn plan(&self, id: &PlanId) -> Option<TrainingPlan> {
        self.lock().plans.get(id).cloned()
    }

    pub fn assignment(&self, id: &AssignmentId) -> Option<Assignment> {
        self.lock().assignments.get(id).cloned()
    }

    pub fn uploads_for(&self, assignment_id: &AssignmentId) -> Vec<Upload> {
        self.lock()
            .uploads
            .values()
            .filter(|upload| upload.assignment_id() == *assignment_id)
            .cloned()
            .collect()
    }

    /// Drop an upload record behind the services' back.
    pub fn forget_upload(&self, id: &UploadId) -> Option<Upload> {
        self.lock().uploads.remove(id)
    }

    /// Drop a workout row without cascading, leaving its assignments orphaned.
    pub fn orphan_workout(&self, id: &WorkoutId) -> Option<Workout> {
        self.lock().workouts.remove(id)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn trip<E>(&self, operation: &'static str, into: fn(Fault, String) -> E) -> Result<(), E> {
        match self.failures.tripped(operation) {
            Some(fault) => Err(into(fault, format!("injected {operation} failure"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        self.trip("users.find_by_id", user_fault)?;
        let state = self.lock();
        state
            .users
            .get(id)
            .map(|user| state.hydrate(user))
            .transpose()
            .map_err(|err| UserRepositoryError::query(err.to_string()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.trip("users.find_by_email", user_fault)?;
        let state = self.lock();
        state
            .users
            .values()
            .find(|user| user.email() == email)
            .map(|user| state.hydrate(user))
            .transpose()
            .map_err(|err| UserRepositoryError::query(err.to_string()))
    }

    async fn save(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.trip("users.save", user_fault)?;
        let mut state = self.lock();
        let taken = state
            .users
            .values()
            .any(|other| other.email() == user.email() && other.id() != user.id());
        if taken {
            return Err(UserRepositoryError::query(format!(
                "email {} is already registered",
                user.email()
            )));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn add_client_link(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        self.trip("users.add_client_link", user_fault)?;
        let mut state = self.lock();
        let linked_elsewhere = state
            .clients_of
            .iter()
            .any(|(trainer, clients)| trainer != trainer_id && clients.contains(client_id));
        if linked_elsewhere {
            return Err(UserRepositoryError::query(format!(
                "client {client_id} is already linked to another trainer"
            )));
        }
        let clients = state.clients_of.entry(*trainer_id).or_default();
        if !clients.contains(client_id) {
            clients.push(*client_id);
        }
        Ok(())
    }

    async fn remove_client_link(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        self.trip("users.remove_client_link", user_fault)?;
        if let Some(clients) = self.lock().clients_of.get_mut(trainer_id) {
            clients.retain(|id| id != client_id);
        }
        Ok(())
    }

    async fn set_trainer(
        &self,
        client_id: &UserId,
        trainer_id: &UserId,
    ) -> Result<(), UserRepositoryError> {
        self.trip("users.set_trainer", user_fault)?;
        let mut state = self.lock();
        if !state.users.contains_key(client_id) {
            return Err(UserRepositoryError::query(format!(
                "client {client_id} disappeared before its trainer was set"
            )));
        }
        state.trainer_of.insert(*client_id, *trainer_id);
        Ok(())
    }

    async fn list_clients(&self, trainer_id: &UserId) -> Result<Vec<User>, UserRepositoryError> {
        self.trip("users.list_clients", user_fault)?;
        let state = self.lock();
        let mut clients = state
            .clients_of
            .get(trainer_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.users.get(id))
                    .map(|user| state.hydrate(user))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|err| UserRepositoryError::query(err.to_string()))?
            .unwrap_or_default();
        clients.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(clients)
    }
}

#[async_trait]
impl ExerciseRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &ExerciseId,
    ) -> Result<Option<Exercise>, ExerciseRepositoryError> {
        self.trip("exercises.find_by_id", exercise_fault)?;
        Ok(self.lock().exercises.get(id).cloned())
    }

    async fn list_for_trainer(
        &self,
        trainer_id: &UserId,
    ) -> Result<Vec<Exercise>, ExerciseRepositoryError> {
        self.trip("exercises.list_for_trainer", exercise_fault)?;
        let mut exercises: Vec<Exercise> = self
            .lock()
            .exercises
            .values()
            .filter(|exercise| exercise.trainer_id() == *trainer_id)
            .cloned()
            .collect();
        exercises.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(exercises)
    }

    async fn insert(&self, exercise: &Exercise) -> Result<(), ExerciseRepositoryError> {
        self.trip("exercises.insert", exercise_fault)?;
        let mut state = self.lock();
        if state.exercises.contains_key(&exercise.id()) {
            return Err(ExerciseRepositoryError::query(format!(
                "exercise {} already exists",
                exercise.id()
            )));
        }
        state.exercises.insert(exercise.id(), exercise.clone());
        Ok(())
    }

    async fn update(&self, exercise: &Exercise) -> Result<bool, ExerciseRepositoryError> {
        self.trip("exercises.update", exercise_fault)?;
        Ok(self
            .lock()
            .exercises
            .get_mut(&exercise.id())
            .map(|stored| *stored = exercise.clone())
            .is_some())
    }

    async fn delete_owned(
        &self,
        id: &ExerciseId,
        trainer_id: &UserId,
    ) -> Result<bool, ExerciseRepositoryError> {
        self.trip("exercises.delete_owned", exercise_fault)?;
        let mut state = self.lock();
        let owned = state
            .exercises
            .get(id)
            .is_some_and(|exercise| exercise.trainer_id() == *trainer_id);
        if owned {
            state.exercises.remove(id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl TrainingPlanRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &PlanId,
    ) -> Result<Option<TrainingPlan>, TrainingPlanRepositoryError> {
        self.trip("plans.find_by_id", plan_fault)?;
        Ok(self.lock().plans.get(id).cloned())
    }

    async fn list_for_pair(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
    ) -> Result<Vec<TrainingPlan>, TrainingPlanRepositoryError> {
        self.trip("plans.list_for_pair", plan_fault)?;
        let mut plans: Vec<TrainingPlan> = self
            .lock()
            .plans
            .values()
            .filter(|plan| plan.trainer_id() == *trainer_id && plan.client_id() == *client_id)
            .cloned()
            .collect();
        plans.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(plans)
    }

    async fn insert(&self, plan: &TrainingPlan) -> Result<(), TrainingPlanRepositoryError> {
        self.trip("plans.insert", plan_fault)?;
        let mut state = self.lock();
        if state.plans.contains_key(&plan.id()) {
            return Err(TrainingPlanRepositoryError::query(format!(
                "plan {} already exists",
                plan.id()
            )));
        }
        state.plans.insert(plan.id(), plan.clone());
        Ok(())
    }

    async fn update(&self, plan: &TrainingPlan) -> Result<bool, TrainingPlanRepositoryError> {
        self.trip("plans.update", plan_fault)?;
        Ok(self
            .lock()
            .plans
            .get_mut(&plan.id())
            .map(|stored| *stored = plan.clone())
            .is_some())
    }

    async fn deactivate_others(
        &self,
        trainer_id: &UserId,
        client_id: &UserId,
        keep: &PlanId,
    ) -> Result<u64, TrainingPlanRepositoryError> {
        self.trip("plans.deactivate_others", plan_fault)?;
        let mut state = self.lock();
        let now = Utc::now();
        let mut changed = 0_u64;
        for plan in state.plans.values_mut() {
            let sibling = plan.trainer_id() == *trainer_id
                && plan.client_id() == *client_id
                && plan.id() != *keep;
            if !sibling || !plan.is_active() {
                continue;
            }
            let details = PlanDetails {
                is_active: false,
                ..plan.details()
            };
            *plan = plan
                .revise(details, now)
                .map_err(|err| TrainingPlanRepositoryError::query(err.to_string()))?;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_owned(
        &self,
        id: &PlanId,
        trainer_id: &UserId,
    ) -> Result<bool, TrainingPlanRepositoryError> {
        self.trip("plans.delete_owned", plan_fault)?;
        let mut state = self.lock();
        let owned = state
            .plans
            .get(id)
            .is_some_and(|plan| plan.trainer_id() == *trainer_id);
        Ok(owned && state.remove_plan(id))
    }
}

#[async_trait]
impl WorkoutRepository for InMemoryStore {
    async fn find_by_id(&self, id: &WorkoutId) -> Result<Option<Workout>, WorkoutRepositoryError> {
        self.trip("workouts.find_by_id", workout_fault)?;
        Ok(self.lock().workouts.get(id).cloned())
    }

    async fn list_for_plan(
        &self,
        plan_id: &PlanId,
    ) -> Result<Vec<Workout>, WorkoutRepositoryError> {
        self.trip("workouts.list_for_plan", workout_fault)?;
        let mut workouts: Vec<Workout> = self
            .lock()
            .workouts
            .values()
            .filter(|workout| workout.plan_id() == *plan_id)
            .cloned()
            .collect();
        workouts.sort_by_key(|workout| {
            (workout.sequence(), workout.day_of_week().is_none(), workout.day_of_week())
        });
        Ok(workouts)
    }

    async fn insert(&self, workout: &Workout) -> Result<(), WorkoutRepositoryError> {
        self.trip("workouts.insert", workout_fault)?;
        let mut state = self.lock();
        if !state.plans.contains_key(&workout.plan_id()) {
            return Err(WorkoutRepositoryError::query(format!(
                "plan {} does not exist",
                workout.plan_id()
            )));
        }
        if state.workouts.contains_key(&workout.id()) {
            return Err(WorkoutRepositoryError::query(format!(
                "workout {} already exists",
                workout.id()
            )));
        }
        state.workouts.insert(workout.id(), workout.clone());
        Ok(())
    }

    async fn update(&self, workout: &Workout) -> Result<bool, WorkoutRepositoryError> {
        self.trip("workouts.update", workout_fault)?;
        let mut state = self.lock();
        let Some(existing) = state.workouts.get_mut(&workout.id()) else {
            return Ok(false);
        };
        // The owner copies and the parent plan are fixed at insert time.
        *existing = Workout::new(WorkoutDraft {
            id: existing.id(),
            plan_id: existing.plan_id(),
            trainer_id: existing.trainer_id(),
            client_id: existing.client_id(),
            details: workout.details(),
            created_at: existing.created_at(),
            updated_at: workout.updated_at(),
        })
        .map_err(|err| WorkoutRepositoryError::query(err.to_string()))?;
        Ok(true)
    }

    async fn delete_owned(
        &self,
        id: &WorkoutId,
        trainer_id: &UserId,
    ) -> Result<bool, WorkoutRepositoryError> {
        self.trip("workouts.delete_owned", workout_fault)?;
        let mut state = self.lock();
        let owned = state
            .workouts
            .get(id)
            .is_some_and(|workout| workout.trainer_id() == *trainer_id);
        Ok(owned && state.remove_workout(id))
    }

    async fn delete(&self, id: &WorkoutId) -> Result<bool, WorkoutRepositoryError> {
        self.trip("workouts.delete", workout_fault)?;
        Ok(self.lock().remove_workout(id))
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        self.trip("assignments.find_by_id", assignment_fault)?;
        Ok(self.lock().assignments.get(id).cloned())
    }

    async fn list_for_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        self.trip("assignments.list_for_workout", assignment_fault)?;
        let mut assignments: Vec<Assignment> = self
            .lock()
            .assignments
            .values()
            .filter(|assignment| assignment.workout_id() == *workout_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|assignment| (assignment.sequence(), assignment.assigned_at()));
        Ok(assignments)
    }

    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        self.trip("assignments.insert", assignment_fault)?;
        let mut state = self.lock();
        if !state.workouts.contains_key(&assignment.workout_id()) {
            return Err(AssignmentRepositoryError::query(format!(
                "workout {} does not exist",
                assignment.workout_id()
            )));
        }
        if state.assignments.contains_key(&assignment.id()) {
            return Err(AssignmentRepositoryError::query(format!(
                "assignment {} already exists",
                assignment.id()
            )));
        }
        state.assignments.insert(assignment.id(), assignment.clone());
        Ok(())
    }

    async fn update(&self, assignment: &Assignment) -> Result<bool, AssignmentRepositoryError> {
        self.trip("assignments.update", assignment_fault)?;
        Ok(self
            .lock()
            .assignments
            .get_mut(&assignment.id())
            .map(|stored| *stored = assignment.clone())
            .is_some())
    }

    async fn delete_owned(
        &self,
        id: &AssignmentId,
        trainer_id: &UserId,
    ) -> Result<bool, AssignmentRepositoryError> {
        self.trip("assignments.delete_owned", assignment_fault)?;
        let mut state = self.lock();
        let owned = state
            .assignments
            .get(id)
            .and_then(|assignment| state.workouts.get(&assignment.workout_id()))
            .is_some_and(|workout| workout.trainer_id() == *trainer_id);
        Ok(owned && state.remove_assignment(id))
    }

    async fn delete(&self, id: &AssignmentId) -> Result<bool, AssignmentRepositoryError> {
        self.trip("assignments.delete", assignment_fault)?;
        Ok(self.lock().remove_assignment(id))
    }
}

#[async_trait]
impl UploadRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UploadId) -> Result<Option<Upload>, UploadRepositoryError> {
        self.trip("uploads.find_by_id", upload_fault)?;
        Ok(self.lock().uploads.get(id).cloned())
    }

    async fn list_for_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<Upload>, UploadRepositoryError> {
        self.trip("uploads.list_for_assignment", upload_fault)?;
        let mut uploads = self.uploads_for(assignment_id);
        uploads.sort_by_key(Upload::uploaded_at);
        Ok(uploads)
    }

    async fn insert(&self, upload: &Upload) -> Result<(), UploadRepositoryError> {
        self.trip("uploads.insert", upload_fault)?;
        let mut state = self.lock();
        if !state.assignments.contains_key(&upload.assignment_id()) {
            return Err(UploadRepositoryError::query(format!(
                "assignment {} does not exist",
                upload.assignment_id()
            )));
        }
        let duplicate = state.uploads.values().any(|other| {
            other.id() == upload.id() || other.object_key() == upload.object_key()
        });
        if duplicate {
            return Err(UploadRepositoryError::query(format!(
                "upload {} or key {} already recorded",
                upload.id(),
                upload.object_key()
            )));
        }
        state.uploads.insert(upload.id(), upload.clone());
        Ok(())
    }

    async fn delete(&self, id: &UploadId) -> Result<bool, UploadRepositoryError> {
        self.trip("uploads.delete", upload_fault)?;
        Ok(self.lock().uploads.remove(id).is_some())
    }
}
