use crate::domain::entities::DutySlot;
use crate::domain::ports::assignment_store::AssignmentStore;
use crate::domain::services::SlotCapacity;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::sync::Arc;

/// Reads effective capacity and occupancy from the store.
/// Holds no counters of its own; every answer reflects current store state.
#[derive(Clone)]
pub struct CapacityResolver {
    store: Arc<dyn AssignmentStore>,
}

impl CapacityResolver {
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self { store }
    }

    pub async fn effective_capacity(&self, duty_slot_id: &str) -> ApiResult<u32> {
        self.store.effective_capacity(duty_slot_id).await
    }

    pub async fn occupied(&self, duty_slot_id: &str) -> ApiResult<u32> {
        self.store.occupied_count(duty_slot_id).await
    }

    pub async fn remaining(&self, duty_slot_id: &str) -> ApiResult<u32> {
        let effective = self.effective_capacity(duty_slot_id).await?;
        let occupied = self.occupied(duty_slot_id).await?;
        Ok(effective.saturating_sub(occupied))
    }

    pub async fn snapshot(&self, slot: DutySlot) -> ApiResult<SlotCapacity> {
        let occupied = self.occupied(&slot.id).await?;
        Ok(SlotCapacity::new(slot, occupied))
    }

    /// Re-reads the slot row too, so a fresh capacity override is honoured
    pub async fn snapshot_by_id(&self, duty_slot_id: &str) -> ApiResult<SlotCapacity> {
        let slot = self
            .store
            .get_duty_slot(duty_slot_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Duty slot {} not found", duty_slot_id)))?;
        self.snapshot(slot).await
    }

    pub async fn snapshot_all(&self, slots: Vec<DutySlot>) -> ApiResult<Vec<SlotCapacity>> {
        let mut snapshots = Vec::with_capacity(slots.len());
        for slot in slots {
            snapshots.push(self.snapshot(slot).await?);
        }
        Ok(snapshots)
    }
}
