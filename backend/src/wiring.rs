//! Assembly of the service graph from driven port implementations.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AssignmentManagement, AssignmentRepository, ClientProgress, ClientView, ExerciseManagement,
    ExerciseRepository, ObjectStorage, RosterManagement, TrainingPlanManagement,
    TrainingPlanRepository, UploadRepository, UserRepository, VideoUpload, WorkoutManagement,
    WorkoutRepository,
};
use crate::domain::{
    AssignmentService, CascadeSweeper, ClientService, ExerciseService, OwnershipChain,
    RosterService, TrainingPlanService, UploadSagaService, UploadSettings, WorkoutService,
};
use crate::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselExerciseRepository, DieselTrainingPlanRepository,
    DieselUploadRepository, DieselUserRepository, DieselWorkoutRepository,
};

/// Everything the domain needs from the outside world.
#[derive(Clone)]
pub struct DrivenPorts {
    pub users: Arc<dyn UserRepository>,
    pub exercises: Arc<dyn ExerciseRepository>,
    pub plans: Arc<dyn TrainingPlanRepository>,
    pub workouts: Arc<dyn WorkoutRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub uploads: Arc<dyn UploadRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub clock: Arc<dyn Clock>,
}

impl DrivenPorts {
    /// Back every repository with the shared Diesel pool.
    pub fn from_pool(
        pool: &DbPool,
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            exercises: Arc::new(DieselExerciseRepository::new(pool.clone())),
            plans: Arc::new(DieselTrainingPlanRepository::new(pool.clone())),
            workouts: Arc::new(DieselWorkoutRepository::new(pool.clone())),
            assignments: Arc::new(DieselAssignmentRepository::new(pool.clone())),
            uploads: Arc::new(DieselUploadRepository::new(pool.clone())),
            storage,
            clock,
        }
    }

    fn ownership_chain(&self) -> OwnershipChain {
        OwnershipChain::new(
            Arc::clone(&self.plans),
            Arc::clone(&self.workouts),
            Arc::clone(&self.assignments),
        )
    }

    fn cascade_sweeper(&self) -> CascadeSweeper {
        CascadeSweeper::new(
            Arc::clone(&self.workouts),
            Arc::clone(&self.assignments),
            Arc::clone(&self.uploads),
            Arc::clone(&self.storage),
        )
    }
}

/// Driving ports handed to inbound adapters.
#[derive(Clone)]
pub struct Services {
    pub roster: Arc<dyn RosterManagement>,
    pub exercises: Arc<dyn ExerciseManagement>,
    pub plans: Arc<dyn TrainingPlanManagement>,
    pub workouts: Arc<dyn WorkoutManagement>,
    pub assignments: Arc<dyn AssignmentManagement>,
    pub progress: Arc<dyn ClientProgress>,
    pub client_view: Arc<dyn ClientView>,
    pub uploads: Arc<dyn VideoUpload>,
}

impl Services {
    pub fn new(ports: &DrivenPorts, settings: UploadSettings) -> Self {
        let client = Arc::new(ClientService::new(
            Arc::clone(&ports.users),
            Arc::clone(&ports.plans),
            Arc::clone(&ports.workouts),
            Arc::clone(&ports.assignments),
            Arc::clone(&ports.clock),
        ));

        Self {
            roster: Arc::new(RosterService::new(
                Arc::clone(&ports.users),
                Arc::clone(&ports.clock),
            )),
            exercises: Arc::new(ExerciseService::new(
                Arc::clone(&ports.exercises),
                Arc::clone(&ports.clock),
            )),
            plans: Arc::new(TrainingPlanService::new(
                Arc::clone(&ports.users),
                Arc::clone(&ports.plans),
                ports.ownership_chain(),
                ports.cascade_sweeper(),
                Arc::clone(&ports.clock),
            )),
            workouts: Arc::new(WorkoutService::new(
                Arc::clone(&ports.workouts),
                ports.ownership_chain(),
                ports.cascade_sweeper(),
                Arc::clone(&ports.clock),
            )),
            assignments: Arc::new(AssignmentService::new(
                Arc::clone(&ports.exercises),
                Arc::clone(&ports.assignments),
                ports.ownership_chain(),
                ports.cascade_sweeper(),
                Arc::clone(&ports.clock),
            )),
            progress: Arc::clone(&client) as Arc<dyn ClientProgress>,
            client_view: client,
            uploads: Arc::new(UploadSagaService::new(
                ports.ownership_chain(),
                Arc::clone(&ports.assignments),
                Arc::clone(&ports.uploads),
                Arc::clone(&ports.storage),
                Arc::clone(&ports.clock),
                settings,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use mockable::DefaultClock;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{
        FixtureAssignmentRepository, FixtureExerciseRepository, FixtureObjectStorage,
        FixtureTrainingPlanRepository, FixtureUploadRepository, FixtureUserRepository,
        FixtureWorkoutRepository,
    };
    use crate::domain::{ErrorCode, UserId};

    fn fixture_ports() -> DrivenPorts {
        DrivenPorts {
            users: Arc::new(FixtureUserRepository),
            exercises: Arc::new(FixtureExerciseRepository),
            plans: Arc::new(FixtureTrainingPlanRepository),
            workouts: Arc::new(FixtureWorkoutRepository),
            assignments: Arc::new(FixtureAssignmentRepository),
            uploads: Arc::new(FixtureUploadRepository),
            storage: Arc::new(FixtureObjectStorage),
            clock: Arc::new(DefaultClock),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_graph_answers_through_the_driving_ports() {
        let services = Services::new(&fixture_ports(), UploadSettings::default());

        let err = services
            .client_view
            .list_my_plans(UserId::random())
            .await
            .expect_err("unknown client");
        assert_eq!(err.code(), ErrorCode::NotFound);

        let clients = services
            .roster
            .list_clients(UserId::random())
            .await
            .expect_err("unknown trainer");
        assert_eq!(clients.code(), ErrorCode::NotFound);
    }
}
