use crate::domain::entities::{Assignment, AssignmentStatus, BatchAudit, Drive, DutySlot};
use crate::domain::ports::eligibility::EligibilityPolicy;
use crate::infrastructure::http::middleware::error::ApiResult;

/// Persistence port for the assignment engine.
///
/// Capacity-guarded writes (`create_assignment` with `Assigned`,
/// `transition_assignment` to `Assigned`) must check occupancy and write in one
/// atomic step. When the guard fails, or the one-active-assignment-per-drive
/// rule is violated, implementations return `ApiError::Conflict`.
#[async_trait::async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Duty slots of the drive that the eligibility policy admits for this volunteer
    async fn list_candidate_duty_slots(
        &self,
        drive_id: &str,
        volunteer_id: &str,
        eligibility: &dyn EligibilityPolicy,
    ) -> ApiResult<Vec<DutySlot>>;

    /// Count of `assigned` rows for the slot
    async fn occupied_count(&self, duty_slot_id: &str) -> ApiResult<u32>;

    async fn effective_capacity(&self, duty_slot_id: &str) -> ApiResult<u32>;

    async fn create_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
        duty_slot_id: &str,
        status: AssignmentStatus,
    ) -> ApiResult<Assignment>;

    async fn transition_assignment(
        &self,
        assignment_id: &str,
        to_status: AssignmentStatus,
    ) -> ApiResult<Assignment>;

    /// Registered volunteers with no active assignment, earliest registration first
    async fn list_unassigned_volunteers(&self, drive_id: &str) -> ApiResult<Vec<String>>;

    /// Waitlisted rows for the slot in FIFO order
    async fn list_waitlisted(&self, duty_slot_id: &str) -> ApiResult<Vec<Assignment>>;

    async fn get_drive(&self, drive_id: &str) -> ApiResult<Option<Drive>>;

    async fn get_duty_slot(&self, duty_slot_id: &str) -> ApiResult<Option<DutySlot>>;

    /// All duty slots of the drive in declared order
    async fn list_duty_slots(&self, drive_id: &str) -> ApiResult<Vec<DutySlot>>;

    async fn get_assignment(&self, assignment_id: &str) -> ApiResult<Option<Assignment>>;

    /// The volunteer's assigned or waitlisted row for the drive, if any
    async fn find_active_assignment(
        &self,
        volunteer_id: &str,
        drive_id: &str,
    ) -> ApiResult<Option<Assignment>>;

    async fn record_batch_audit(&self, audit: &BatchAudit) -> ApiResult<()>;

    /// Replaces the slot's administrative override and returns the updated slot.
    /// `None` restores the base capacity.
    async fn set_capacity_override(
        &self,
        duty_slot_id: &str,
        manual_capacity_override: Option<u32>,
    ) -> ApiResult<DutySlot>;
}
