use crate::application::services::{retry_on_conflict, CapacityResolver, RetryPolicy};
use crate::domain::entities::{Assignment, AssignmentOutcome, AssignmentStatus, Drive};
use crate::domain::errors::require_id;
use crate::domain::ports::{assignment_store::AssignmentStore, eligibility::EligibilityPolicy};
use crate::domain::services::{pick_open_slot, rank_candidates};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

/// Decides, for one volunteer and one drive, whether to assign, waitlist or skip
#[derive(Clone)]
pub struct AssignmentEngine {
    store: Arc<dyn AssignmentStore>,
    eligibility: Arc<dyn EligibilityPolicy>,
    capacity: CapacityResolver,
    retry: RetryPolicy,
}

impl AssignmentEngine {
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        eligibility: Arc<dyn EligibilityPolicy>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            capacity: CapacityResolver::new(store.clone()),
            store,
            eligibility,
            retry,
        }
    }

    /// Assign the volunteer within the drive, or waitlist them on the most
    /// preferred candidate slot when every candidate is full.
    ///
    /// Idempotent: a volunteer who already holds an active assignment for the
    /// drive gets that assignment's outcome back and nothing is written.
    pub async fn assign(&self, volunteer_id: &str, drive_id: &str) -> ApiResult<AssignmentOutcome> {
        require_id("volunteerId", volunteer_id)?;
        require_id("driveId", drive_id)?;

        // A lost race means either the slot filled up or a concurrent call
        // created this volunteer's row; both are resolved by deciding again.
        retry_on_conflict(&self.retry, "assign", || self.decide(volunteer_id, drive_id)).await
    }

    /// Single-volunteer request over several drives, processed in the given order
    pub async fn assign_to_drives(
        &self,
        volunteer_id: &str,
        drive_ids: &[String],
    ) -> ApiResult<Vec<(Drive, AssignmentOutcome)>> {
        require_id("volunteerId", volunteer_id)?;
        if drive_ids.is_empty() {
            return Err(ApiError::BadRequest("driveIds must not be empty".to_string()));
        }

        let mut outcomes = Vec::with_capacity(drive_ids.len());
        for drive_id in drive_ids {
            require_id("driveId", drive_id)?;
            let drive = self
                .store
                .get_drive(drive_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Drive {} not found", drive_id)))?;

            let outcome = self.assign(volunteer_id, &drive.id).await?;
            outcomes.push((drive, outcome));
        }
        Ok(outcomes)
    }

    async fn decide(&self, volunteer_id: &str, drive_id: &str) -> ApiResult<AssignmentOutcome> {
        if let Some(existing) = self
            .store
            .find_active_assignment(volunteer_id, drive_id)
            .await?
        {
            tracing::info!(
                "Volunteer {} already {} for drive {} (idempotent request)",
                volunteer_id,
                existing.status,
                drive_id
            );
            return self.describe(&existing).await;
        }

        let slots = self
            .store
            .list_candidate_duty_slots(drive_id, volunteer_id, self.eligibility.as_ref())
            .await?;

        if slots.is_empty() {
            tracing::info!(
                "No candidate duty slots for volunteer {} in drive {}",
                volunteer_id,
                drive_id
            );
            metrics::counter!("roster_assignments_total", "outcome" => "none").increment(1);
            return Ok(AssignmentOutcome::None);
        }

        let mut ranked = self.capacity.snapshot_all(slots).await?;
        rank_candidates(&mut ranked);

        if let Some(open) = pick_open_slot(&ranked) {
            tracing::debug!(
                "Duty slot {} selected for volunteer {} ({}/{} occupied)",
                open.slot.id,
                volunteer_id,
                open.occupied,
                open.effective_capacity()
            );

            let assignment = self
                .store
                .create_assignment(volunteer_id, drive_id, &open.slot.id, AssignmentStatus::Assigned)
                .await?;

            tracing::info!(
                "Volunteer {} assigned to duty slot {} ({}) in drive {}",
                volunteer_id,
                open.slot.name,
                open.slot.id,
                drive_id
            );
            metrics::counter!("roster_assignments_total", "outcome" => "assigned").increment(1);

            return Ok(AssignmentOutcome::Assigned {
                assignment_id: assignment.id,
                duty_slot_id: open.slot.id.clone(),
                duty_slot_name: open.slot.name.clone(),
            });
        }

        // Every candidate is full: queue on the single most-preferred one
        let target = &ranked[0];
        if target.slot.is_closed() {
            tracing::debug!(
                "Duty slot {} is closed by capacity override, queueing volunteer {}",
                target.slot.id,
                volunteer_id
            );
        }
        let assignment = self
            .store
            .create_assignment(volunteer_id, drive_id, &target.slot.id, AssignmentStatus::Waitlisted)
            .await?;
        let position = self.waitlist_position(&assignment).await?;

        tracing::info!(
            "Volunteer {} waitlisted on duty slot {} ({}) in drive {} at position {:?}",
            volunteer_id,
            target.slot.name,
            target.slot.id,
            drive_id,
            position
        );
        metrics::counter!("roster_assignments_total", "outcome" => "waitlisted").increment(1);

        Ok(AssignmentOutcome::Waitlisted {
            assignment_id: assignment.id,
            duty_slot_id: target.slot.id.clone(),
            duty_slot_name: target.slot.name.clone(),
            position,
        })
    }

    /// Outcome view of an existing assignment
    pub async fn describe(&self, assignment: &Assignment) -> ApiResult<AssignmentOutcome> {
        let slot = self
            .store
            .get_duty_slot(&assignment.duty_slot_id)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!(
                    "Assignment {} references missing duty slot {}",
                    assignment.id, assignment.duty_slot_id
                ))
            })?;

        match assignment.status {
            AssignmentStatus::Assigned => Ok(AssignmentOutcome::Assigned {
                assignment_id: assignment.id.clone(),
                duty_slot_id: slot.id,
                duty_slot_name: slot.name,
            }),
            AssignmentStatus::Waitlisted => Ok(AssignmentOutcome::Waitlisted {
                assignment_id: assignment.id.clone(),
                duty_slot_id: slot.id,
                duty_slot_name: slot.name,
                position: self.waitlist_position(assignment).await?,
            }),
            AssignmentStatus::Cancelled => Ok(AssignmentOutcome::None),
        }
    }

    async fn waitlist_position(&self, assignment: &Assignment) -> ApiResult<Option<u32>> {
        let waitlist = self.store.list_waitlisted(&assignment.duty_slot_id).await?;
        Ok(waitlist
            .iter()
            .position(|entry| entry.id == assignment.id)
            .map(|index| index as u32 + 1))
    }
}
