use crate::application::services::AssignmentEngine;
use crate::domain::entities::{AssignmentOutcome, BatchAudit, BatchReport, VolunteerResult};
use crate::domain::errors::require_id;
use crate::domain::ports::assignment_store::AssignmentStore;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::now_timestamp;
use std::sync::Arc;

/// Runs the assignment decision over every unassigned volunteer of a drive.
///
/// Volunteers are processed one at a time in registration order so earlier
/// registrants get capacity first. A failure for one volunteer is recorded in
/// the report and never stops the run.
#[derive(Clone)]
pub struct BatchCoordinator {
    store: Arc<dyn AssignmentStore>,
    engine: AssignmentEngine,
}

impl BatchCoordinator {
    pub fn new(store: Arc<dyn AssignmentStore>, engine: AssignmentEngine) -> Self {
        Self { store, engine }
    }

    /// `actor_id` is recorded for audit only and does not influence placement
    pub async fn batch_assign(&self, drive_id: &str, actor_id: &str) -> ApiResult<BatchReport> {
        require_id("driveId", drive_id)?;
        require_id("actorId", actor_id)?;

        self.store
            .get_drive(drive_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Drive {} not found", drive_id)))?;

        let batch_id = uuid::Uuid::new_v4().to_string();
        let started_at = now_timestamp();
        let volunteers = self.store.list_unassigned_volunteers(drive_id).await?;

        tracing::info!(
            "Batch {} started by {} for drive {} over {} volunteers",
            batch_id,
            actor_id,
            drive_id,
            volunteers.len()
        );

        let mut results = Vec::with_capacity(volunteers.len());
        for volunteer_id in volunteers {
            let outcome = match self.engine.assign(&volunteer_id, drive_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if e.is_transient() {
                        tracing::warn!(
                            "Batch {}: volunteer {} skipped after store contention: {}",
                            batch_id,
                            volunteer_id,
                            e
                        );
                    } else {
                        tracing::error!(
                            "Batch {}: assignment failed for volunteer {}: {}",
                            batch_id,
                            volunteer_id,
                            e
                        );
                    }
                    metrics::counter!("roster_assignments_total", "outcome" => "failed")
                        .increment(1);
                    AssignmentOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            results.push(VolunteerResult {
                volunteer_id,
                outcome,
            });
        }

        let report = BatchReport {
            batch_id,
            drive_id: drive_id.to_string(),
            actor_id: actor_id.to_string(),
            started_at,
            finished_at: now_timestamp(),
            results,
        };

        let audit = BatchAudit::from(&report);
        if let Err(e) = self.store.record_batch_audit(&audit).await {
            // The placements are already committed; losing the summary row must not hide them
            tracing::error!("Failed to record audit for batch {}: {}", report.batch_id, e);
        }

        tracing::info!(
            "Batch {} finished: {} assigned, {} waitlisted, {} none, {} failed",
            report.batch_id,
            audit.assigned_count,
            audit.waitlisted_count,
            audit.none_count,
            audit.failed_count
        );

        Ok(report)
    }
}
