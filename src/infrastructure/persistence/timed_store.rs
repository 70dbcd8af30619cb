use crate::domain::entities::{Assignment, AssignmentStatus, BatchAudit, Drive, DutySlot};
use crate::domain::ports::assignment_store::AssignmentStore;
use crate::domain::ports::eligibility::EligibilityPolicy;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Bounds every store call with a deadline.
///
/// An elapsed call surfaces as `ApiError::Timeout` so callers can isolate it
/// per item instead of hanging.
#[derive(Clone)]
pub struct TimedStore {
    inner: Arc<dyn AssignmentStore>,
    timeout: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn AssignmentStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = ApiResult<T>> + Send,
    ) -> ApiResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                metrics::counter!("roster_store_timeouts_total", "operation" => operation.to_string())
                    .increment(1);
                tracing::warn!("Store call {} exceeded {:?}", operation, self.timeout);
                Err(ApiError::Timeout(format!(
                    "Store call {} exceeded {}ms",
                    operation,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl AssignmentStore for TimedStore {
    async fn list_candidate_duty_slots(
        &self,
        drive_id: &str,
        volunteer_id: &str,
        eligibility: &dyn EligibilityPolicy,
    ) -> ApiResult<Vec<DutySlot>> {
        self.bounded(
            "list_candidate_duty_slots",
            self.inner
                .list_candidate_duty_slots(drive_id, volunteer_id, eligibility),
        )
        .await
    }

    async fn occupied_count(&self, duty_slot_id: &str) -> ApiResult<u32> {
        self.bounded("occupied_count", self.inner.occupied_count(duty_slot_id))
            .await
    }

    async fn effective_capacity(&self, duty_slot_id: &str) -> ApiResult<u32> {
        self.bounded(
            "effective_capacity",
            self.inner.effective_capacity(duty_slot_id),
        )
        .await
    }

    async fn create_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
        duty_slot_id: &str,
        status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        self.bounded(
            "create_assignment",
            self.inner
                .create_assignment(volunteer_id, drive_id, duty_slot_id, status),
        )
        .await
    }

    async fn transition_assignment(
        &self,
        assignment_id: &str,
        to_status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        self.bounded(
            "transition_assignment",
            self.inner.transition_assignment(assignment_id, to_status),
        )
        .await
    }

    async fn list_unassigned_volunteers(&self, drive_id: &str) -> ApiResult<Vec<String>> {
        self.bounded(
            "list_unassigned_volunteers",
            self.inner.list_unassigned_volunteers(drive_id),
        )
        .await
    }

    async fn list_waitlisted(&self, duty_slot_id: &str) -> ApiResult<Vec<Assignment>> {
        self.bounded("list_waitlisted", self.inner.list_waitlisted(duty_slot_id))
            .await
    }

    async fn get_drive(&self, drive_id: &str) -> ApiResult<Option<Drive>> {
        self.bounded("get_drive", self.inner.get_drive(drive_id)).await
    }

    async fn get_duty_slot(&self, duty_slot_id: &str) -> ApiResult<Option<DutySlot>> {
        self.bounded("get_duty_slot", self.inner.get_duty_slot(duty_slot_id))
            .await
    }

    async fn list_duty_slots(&self, drive_id: &str) -> ApiResult<Vec<DutySlot>> {
        self.bounded("list_duty_slots", self.inner.list_duty_slots(drive_id))
            .await
    }

    async fn get_assignment(&self, assignment_id: &str) -> ApiResult<Option<Assignment>> {
        self.bounded("get_assignment", self.inner.get_assignment(assignment_id))
            .await
    }

    async fn find_active_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
    ) -> ApiResult<Option<Assignment>> {
        self.bounded(
            "find_active_assignment",
            self.inner.find_active_assignment(volunteer_id, drive_id),
        )
        .await
    }

    async fn record_batch_audit(&self, audit: &BatchAudit) -> ApiResult<()> {
        self.bounded("record_batch_audit", self.inner.record_batch_audit(audit))
            .await
    }

    async fn set_capacity_override(
        &self,
        duty_slot_id: &str,
        manual_capacity_override: Option<u32>,
    ) -> ApiResult<DutySlot> {
        self.bounded(
            "set_capacity_override",
            self.inner
                .set_capacity_override(duty_slot_id, manual_capacity_override),
        )
        .await
    }
}
