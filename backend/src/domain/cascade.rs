//! Cascading removal of plan, workout and assignment descendants.
//!
//! The entity store offers no multi-row transactions, so deletion runs in
//! three phases:
//!
//! 1. Inventory every descendant while the parent still exists.
//! 2. Delete the parent with an owner-gated filter.
//! 3. Sweep the inventory child-first, then remove stored objects.
//!
//! Phase 3 is best effort. A failed step is logged and recorded in the
//! [`CascadeReport`], never raised, because the parent is already gone and
//! the caller cannot retry it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, warn};

use super::ports::{AssignmentRepository, ObjectStorage, UploadRepository, WorkoutRepository};
use super::{AssignmentId, Error, PlanId, Upload, UploadId, WorkoutId};

/// Descendants found below a parent before it is deleted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeInventory {
    pub workouts: Vec<WorkoutId>,
    pub assignments: Vec<AssignmentId>,
    pub uploads: Vec<Upload>,
}

/// Which sweep step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStep {
    UploadRecord,
    Assignment,
    Workout,
    StoredObject,
}

impl SweepStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UploadRecord => "upload_record",
            Self::Assignment => "assignment",
            Self::Workout => "workout",
            Self::StoredObject => "stored_object",
        }
    }
}

impl fmt::Display for SweepStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One descendant the sweep could not remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub step: SweepStep,
    pub target: String,
    pub error: String,
}

/// Outcome of a cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub workouts: usize,
    pub assignments: usize,
    pub uploads: usize,
    pub failures: Vec<SweepFailure>,
}

impl CascadeReport {
    /// True when every descendant was removed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Inventories and sweeps descendants for the management services.
#[derive(Clone)]
pub struct CascadeSweeper {
    workouts: Arc<dyn WorkoutRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    uploads: Arc<dyn UploadRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl CascadeSweeper {
    pub fn new(
        workouts: Arc<dyn WorkoutRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        uploads: Arc<dyn UploadRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            workouts,
            assignments,
            uploads,
            storage,
        }
    }

    /// Everything below a plan.
    pub async fn inventory_plan(&self, plan_id: &PlanId) -> Result<CascadeInventory, Error> {
        let mut inventory = CascadeInventory::default();
        for workout in self.workouts.list_for_plan(plan_id).await? {
            inventory.workouts.push(workout.id());
            self.collect_workout_children(&workout.id(), &mut inventory)
                .await?;
        }
        Ok(inventory)
    }

    /// Everything below a workout. The workout itself is not listed.
    pub async fn inventory_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<CascadeInventory, Error> {
        let mut inventory = CascadeInventory::default();
        self.collect_workout_children(workout_id, &mut inventory)
            .await?;
        Ok(inventory)
    }

    /// Uploads below an assignment.
    pub async fn inventory_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<CascadeInventory, Error> {
        Ok(CascadeInventory {
            uploads: self.uploads.list_for_assignment(assignment_id).await?,
            ..CascadeInventory::default()
        })
    }

    async fn collect_workout_children(
        &self,
        workout_id: &WorkoutId,
        inventory: &mut CascadeInventory,
    ) -> Result<(), Error> {
        for assignment in self.assignments.list_for_workout(workout_id).await? {
            inventory.assignments.push(assignment.id());
            inventory
                .uploads
                .extend(self.uploads.list_for_assignment(&assignment.id()).await?);
        }
        Ok(())
    }

    /// Remove every inventoried descendant, child first.
    ///
    /// A row that is already gone counts as removed; stores with cascading
    /// foreign keys will usually have deleted it together with the parent.
    pub async fn sweep(&self, parent: &str, inventory: CascadeInventory) -> CascadeReport {
        let mut report = CascadeReport {
            workouts: inventory.workouts.len(),
            assignments: inventory.assignments.len(),
            uploads: inventory.uploads.len(),
            failures: Vec::new(),
        };

        let upload_ids: Vec<UploadId> = inventory.uploads.iter().map(Upload::id).collect();
        let upload_results = join_all(upload_ids.iter().map(|id| self.uploads.delete(id))).await;
        let mut removable_objects = Vec::new();
        for (upload, result) in inventory.uploads.iter().zip(upload_results) {
            match result {
                Ok(_) => removable_objects.push(upload.object_key().clone()),
                Err(err) => record_failure(
                    &mut report,
                    parent,
                    SweepStep::UploadRecord,
                    upload.id().to_string(),
                    err.to_string(),
                ),
            }
        }

        sweep_step(
            &mut report,
            parent,
            SweepStep::Assignment,
            &inventory.assignments,
            |id| self.assignments.delete(id),
        )
        .await;
        sweep_step(
            &mut report,
            parent,
            SweepStep::Workout,
            &inventory.workouts,
            |id| self.workouts.delete(id),
        )
        .await;

        let object_results = join_all(
            removable_objects
                .iter()
                .map(|key| self.storage.delete_object(key)),
        )
        .await;
        for (key, result) in removable_objects.iter().zip(object_results) {
            if let Err(err) = result {
                record_failure(
                    &mut report,
                    parent,
                    SweepStep::StoredObject,
                    key.to_string(),
                    err.to_string(),
                );
            }
        }

        info!(
            parent,
            workouts = report.workouts,
            assignments = report.assignments,
            uploads = report.uploads,
            failures = report.failures.len(),
            "cascade sweep finished"
        );
        report
    }
}

async fn sweep_step<'a, Id, F, Fut, E>(
    report: &mut CascadeReport,
    parent: &str,
    step: SweepStep,
    ids: &'a [Id],
    delete: F,
) where
    Id: fmt::Display,
    F: Fn(&'a Id) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: fmt::Display,
{
    let results = join_all(ids.iter().map(delete)).await;
    for (id, result) in ids.iter().zip(results) {
        if let Err(err) = result {
            record_failure(report, parent, step, id.to_string(), err.to_string());
        }
    }
}

fn record_failure(
    report: &mut CascadeReport,
    parent: &str,
    step: SweepStep,
    target: String,
    error: String,
) {
    warn!(parent, step = %step, target = %target, error = %error, "cascade sweep step failed");
    report.failures.push(SweepFailure {
        step,
        target,
        error,
    });
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
