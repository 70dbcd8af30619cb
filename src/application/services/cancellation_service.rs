use crate::application::services::{retry_on_conflict, RetryPolicy};
use crate::domain::entities::{Assignment, AssignmentStatus};
use crate::domain::errors::require_id;
use crate::domain::events::RosterEvent;
use crate::domain::ports::{assignment_store::AssignmentStore, event_bus::EventBus};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::now_timestamp;
use std::sync::Arc;

/// Cancellation flow: ends an active assignment and announces any capacity it freed
#[derive(Clone)]
pub struct CancellationService {
    store: Arc<dyn AssignmentStore>,
    event_bus: Arc<dyn EventBus>,
    retry: RetryPolicy,
}

impl CancellationService {
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        event_bus: Arc<dyn EventBus>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            event_bus,
            retry,
        }
    }

    pub async fn cancel_assignment(
        &self,
        assignment_id: &str,
        cancelled_by: &str,
    ) -> ApiResult<Assignment> {
        require_id("assignmentId", assignment_id)?;

        let (previous, cancelled) =
            retry_on_conflict(&self.retry, "cancel", || self.try_cancel(assignment_id)).await?;

        if previous == AssignmentStatus::Cancelled {
            tracing::info!(
                "Assignment {} already cancelled (idempotent request)",
                assignment_id
            );
            return Ok(cancelled);
        }

        let timestamp = now_timestamp();
        self.event_bus.publish(RosterEvent::AssignmentCancelled {
            assignment_id: cancelled.id.clone(),
            volunteer_id: cancelled.volunteer_id.clone(),
            drive_id: cancelled.drive_id.clone(),
            cancelled_by: cancelled_by.to_string(),
            timestamp: timestamp.clone(),
        })?;

        if previous == AssignmentStatus::Assigned {
            self.event_bus.publish(RosterEvent::CapacityFreed {
                drive_id: cancelled.drive_id.clone(),
                duty_slot_id: cancelled.duty_slot_id.clone(),
                timestamp,
            })?;
        }

        tracing::info!(
            "Assignment {} ({}) cancelled by {}",
            cancelled.id,
            previous,
            cancelled_by
        );

        Ok(cancelled)
    }

    // Re-reads the row each attempt: a waitlisted entry may be promoted under us
    async fn try_cancel(&self, assignment_id: &str) -> ApiResult<(AssignmentStatus, Assignment)> {
        let current = self
            .store
            .get_assignment(assignment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Assignment {} not found", assignment_id)))?;

        if !current.status.is_active() {
            return Ok((current.status, current));
        }

        let cancelled = self
            .store
            .transition_assignment(assignment_id, AssignmentStatus::Cancelled)
            .await?;
        Ok((current.status, cancelled))
    }
}
