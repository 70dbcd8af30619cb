use crate::shared::utils::now_timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutySlot {
    pub id: String,
    pub drive_id: String,
    pub name: String,
    pub base_capacity: u32,
    /// Replaces `base_capacity` when present. `Some(0)` closes the slot.
    pub manual_capacity_override: Option<u32>,
    /// Declared duty ordering, lower first
    pub sort_order: i64,
    pub created_at: String,
}

impl DutySlot {
    pub fn new(drive_id: String, name: String, base_capacity: u32, sort_order: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            drive_id,
            name,
            base_capacity,
            manual_capacity_override: None,
            sort_order,
            created_at: now_timestamp(),
        }
    }

    pub fn with_override(mut self, manual_capacity_override: Option<u32>) -> Self {
        self.manual_capacity_override = manual_capacity_override;
        self
    }

    pub fn effective_capacity(&self) -> u32 {
        self.manual_capacity_override.unwrap_or(self.base_capacity)
    }

    pub fn is_closed(&self) -> bool {
        self.effective_capacity() == 0
    }
}
