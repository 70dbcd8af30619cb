use crate::domain::entities::DutySlot;
use crate::domain::errors::require_id;
use crate::domain::events::RosterEvent;
use crate::domain::ports::{assignment_store::AssignmentStore, event_bus::EventBus};
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::shared::utils::now_timestamp;
use std::sync::Arc;

/// Administrative capacity changes for a duty slot.
///
/// Raising the effective capacity publishes `CapacityFreed` so the promotion
/// listener drains the waitlist into the new seats.
#[derive(Clone)]
pub struct CapacityOverrideService {
    store: Arc<dyn AssignmentStore>,
    event_bus: Arc<dyn EventBus>,
}

impl CapacityOverrideService {
    pub fn new(store: Arc<dyn AssignmentStore>, event_bus: Arc<dyn EventBus>) -> Self {
        Self { store, event_bus }
    }

    pub async fn set_override(
        &self,
        duty_slot_id: &str,
        manual_capacity_override: Option<u32>,
        changed_by: &str,
    ) -> ApiResult<DutySlot> {
        require_id("dutySlotId", duty_slot_id)?;

        let previous = self
            .store
            .get_duty_slot(duty_slot_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Duty slot {} not found", duty_slot_id)))?;

        let updated = self
            .store
            .set_capacity_override(duty_slot_id, manual_capacity_override)
            .await?;

        tracing::info!(
            "Duty slot {} capacity {} -> {} (override {:?}) by {}",
            updated.id,
            previous.effective_capacity(),
            updated.effective_capacity(),
            updated.manual_capacity_override,
            changed_by
        );

        if updated.effective_capacity() > previous.effective_capacity() {
            self.event_bus.publish(RosterEvent::CapacityFreed {
                drive_id: updated.drive_id.clone(),
                duty_slot_id: updated.id.clone(),
                timestamp: now_timestamp(),
            })?;
        }

        Ok(updated)
    }
}
