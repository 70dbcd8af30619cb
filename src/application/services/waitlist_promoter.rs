use crate::application::services::{CapacityResolver, RetryPolicy};
use crate::domain::entities::{AssignmentOutcome, AssignmentStatus, PromotionReport, PromotionResult};
use crate::domain::errors::require_id;
use crate::domain::ports::assignment_store::AssignmentStore;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

/// Moves the earliest waitlisted volunteers of each duty slot into freed capacity.
///
/// Each slot is handled on its own: a volunteer waitlisted on one duty is never
/// moved to another duty that happens to have room.
#[derive(Clone)]
pub struct WaitlistPromoter {
    store: Arc<dyn AssignmentStore>,
    capacity: CapacityResolver,
    retry: RetryPolicy,
}

impl WaitlistPromoter {
    pub fn new(store: Arc<dyn AssignmentStore>, retry: RetryPolicy) -> Self {
        Self {
            capacity: CapacityResolver::new(store.clone()),
            store,
            retry,
        }
    }

    pub async fn promote(&self, drive_id: &str) -> ApiResult<PromotionReport> {
        require_id("driveId", drive_id)?;

        self.store
            .get_drive(drive_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Drive {} not found", drive_id)))?;

        let slots = self.store.list_duty_slots(drive_id).await?;
        let mut results = Vec::new();

        for slot in slots {
            if let Err(e) = self.promote_slot(&slot.id, &mut results).await {
                tracing::error!("Promotion on duty slot {} failed: {}", slot.id, e);
                results.push(PromotionResult {
                    duty_slot_id: slot.id.clone(),
                    volunteer_id: None,
                    outcome: AssignmentOutcome::Failed {
                        reason: e.to_string(),
                    },
                });
            }
        }

        let report = PromotionReport {
            drive_id: drive_id.to_string(),
            results,
        };

        tracing::info!(
            "Promotion for drive {}: {} promoted, {} failures",
            drive_id,
            report.promoted().count(),
            report.failures().count()
        );

        Ok(report)
    }

    /// Promotes head-of-line entries until the slot is full or its waitlist is empty.
    /// Capacity is re-checked by the store at each transition.
    async fn promote_slot(
        &self,
        duty_slot_id: &str,
        results: &mut Vec<PromotionResult>,
    ) -> ApiResult<()> {
        let mut conflicts = 0;

        loop {
            let capacity = self.capacity.snapshot_by_id(duty_slot_id).await?;
            if !capacity.has_room() {
                return Ok(());
            }

            let waitlist = self.store.list_waitlisted(duty_slot_id).await?;
            let Some(head) = waitlist.into_iter().next() else {
                return Ok(());
            };

            match self
                .store
                .transition_assignment(&head.id, AssignmentStatus::Assigned)
                .await
            {
                Ok(promoted) => {
                    conflicts = 0;
                    tracing::info!(
                        "Volunteer {} promoted from waitlist on duty slot {} ({})",
                        promoted.volunteer_id,
                        capacity.slot.name,
                        duty_slot_id
                    );
                    metrics::counter!("roster_promotions_total").increment(1);

                    results.push(PromotionResult {
                        duty_slot_id: duty_slot_id.to_string(),
                        volunteer_id: Some(promoted.volunteer_id),
                        outcome: AssignmentOutcome::Assigned {
                            assignment_id: promoted.id,
                            duty_slot_id: duty_slot_id.to_string(),
                            duty_slot_name: capacity.slot.name.clone(),
                        },
                    });
                }
                Err(ApiError::Conflict(msg)) if conflicts < self.retry.max_retries => {
                    // Head was cancelled or promoted elsewhere, or capacity moved; look again
                    let delay = self.retry.delay_for(conflicts);
                    conflicts += 1;
                    metrics::counter!("roster_store_conflicts_total", "operation" => "promote")
                        .increment(1);
                    tracing::info!(
                        "Promotion conflict on duty slot {} ({}), retrying in {}ms",
                        duty_slot_id,
                        msg,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    // Skipping the head would break FIFO, so this slot stops here
                    tracing::error!(
                        "Could not promote volunteer {} on duty slot {}: {}",
                        head.volunteer_id,
                        duty_slot_id,
                        e
                    );
                    results.push(PromotionResult {
                        duty_slot_id: duty_slot_id.to_string(),
                        volunteer_id: Some(head.volunteer_id),
                        outcome: AssignmentOutcome::Failed {
                            reason: e.to_string(),
                        },
                    });
                    return Ok(());
                }
            }
        }
    }
}
