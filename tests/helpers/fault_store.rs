use async_trait::async_trait;
use dutyroster::domain::entities::{Assignment, AssignmentStatus, BatchAudit, Drive, DutySlot};
use dutyroster::domain::ports::assignment_store::AssignmentStore;
use dutyroster::domain::ports::eligibility::EligibilityPolicy;
use dutyroster::infrastructure::http::middleware::{ApiError, ApiResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Store wrapper that injects failures and delays into writes
pub struct FaultStore {
    inner: Arc<dyn AssignmentStore>,
    failing_volunteers: HashSet<String>,
    slow_volunteers: HashSet<String>,
    delay: Duration,
    fail_audit: bool,
    pub injected_conflicts: AtomicU32,
}

impl FaultStore {
    pub fn new(inner: Arc<dyn AssignmentStore>) -> Self {
        Self {
            inner,
            failing_volunteers: HashSet::new(),
            slow_volunteers: HashSet::new(),
            delay: Duration::ZERO,
            fail_audit: false,
            injected_conflicts: AtomicU32::new(0),
        }
    }

    pub fn failing_for(mut self, volunteer_id: &str) -> Self {
        self.failing_volunteers.insert(volunteer_id.to_string());
        self
    }

    pub fn slow_for(mut self, volunteer_id: &str, delay: Duration) -> Self {
        self.slow_volunteers.insert(volunteer_id.to_string());
        self.delay = delay;
        self
    }

    pub fn with_failing_audit(mut self) -> Self {
        self.fail_audit = true;
        self
    }

    /// The next `count` capacity-guarded writes report a lost race
    pub fn with_conflicts(self, count: u32) -> Self {
        self.injected_conflicts.store(count, Ordering::SeqCst);
        self
    }

    fn take_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl AssignmentStore for FaultStore {
    async fn list_candidate_duty_slots(
        &self,
        drive_id: &str,
        volunteer_id: &str,
        eligibility: &dyn EligibilityPolicy,
    ) -> ApiResult<Vec<DutySlot>> {
        self.inner
            .list_candidate_duty_slots(drive_id, volunteer_id, eligibility)
            .await
    }

    async fn occupied_count(&self, duty_slot_id: &str) -> ApiResult<u32> {
        self.inner.occupied_count(duty_slot_id).await
    }

    async fn effective_capacity(&self, duty_slot_id: &str) -> ApiResult<u32> {
        self.inner.effective_capacity(duty_slot_id).await
    }

    async fn create_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
        duty_slot_id: &str,
        status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        if self.failing_volunteers.contains(volunteer_id) {
            return Err(ApiError::Internal(format!(
                "Injected write failure for {}",
                volunteer_id
            )));
        }
        if self.slow_volunteers.contains(volunteer_id) {
            tokio::time::sleep(self.delay).await;
        }
        if status == AssignmentStatus::Assigned && self.take_conflict() {
            return Err(ApiError::Conflict("Injected lost race".to_string()));
        }
        self.inner
            .create_assignment(volunteer_id, drive_id, duty_slot_id, status)
            .await
    }

    async fn transition_assignment(
        &self,
        assignment_id: &str,
        to_status: AssignmentStatus,
    ) -> ApiResult<Assignment> {
        if to_status == AssignmentStatus::Assigned && self.take_conflict() {
            return Err(ApiError::Conflict("Injected lost race".to_string()));
        }
        self.inner.transition_assignment(assignment_id, to_status).await
    }

    async fn list_unassigned_volunteers(&self, drive_id: &str) -> ApiResult<Vec<String>> {
        self.inner.list_unassigned_volunteers(drive_id).await
    }

    async fn list_waitlisted(&self, duty_slot_id: &str) -> ApiResult<Vec<Assignment>> {
        self.inner.list_waitlisted(duty_slot_id).await
    }

    async fn get_drive(&self, drive_id: &str) -> ApiResult<Option<Drive>> {
        self.inner.get_drive(drive_id).await
    }

    async fn get_duty_slot(&self, duty_slot_id: &str) -> ApiResult<Option<DutySlot>> {
        self.inner.get_duty_slot(duty_slot_id).await
    }

    async fn list_duty_slots(&self, drive_id: &str) -> ApiResult<Vec<DutySlot>> {
        self.inner.list_duty_slots(drive_id).await
    }

    async fn get_assignment(&self, assignment_id: &str) -> ApiResult<Option<Assignment>> {
        self.inner.get_assignment(assignment_id).await
    }

    async fn find_active_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
    ) -> ApiResult<Option<Assignment>> {
        self.inner.find_active_assignment(volunteer_id, drive_id).await
    }

    async fn record_batch_audit(&self, audit: &BatchAudit) -> ApiResult<()> {
        if self.fail_audit {
            return Err(ApiError::Internal("Injected audit failure".to_string()));
        }
        self.inner.record_batch_audit(audit).await
    }

    async fn set_capacity_override(
        &self,
        duty_slot_id: &str,
        manual_capacity_override: Option<u32>,
    ) -> ApiResult<DutySlot> {
        self.inner
            .set_capacity_override(duty_slot_id, manual_capacity_override)
            .await
    }
}
