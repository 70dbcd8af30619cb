use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::entities::DutySlot,
    infrastructure::http::controllers::assignments::actor_id,
    infrastructure::http::middleware::{ApiResult, AppState},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityOverrideRequest {
    /// `null` clears the override
    pub manual_capacity_override: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutySlotResponse {
    pub id: String,
    pub drive_id: String,
    pub name: String,
    pub base_capacity: u32,
    pub manual_capacity_override: Option<u32>,
    pub effective_capacity: u32,
}

impl From<DutySlot> for DutySlotResponse {
    fn from(slot: DutySlot) -> Self {
        Self {
            effective_capacity: slot.effective_capacity(),
            id: slot.id,
            drive_id: slot.drive_id,
            name: slot.name,
            base_capacity: slot.base_capacity,
            manual_capacity_override: slot.manual_capacity_override,
        }
    }
}

// PUT /api/duty-slots/:id/capacity-override - Set or clear the administrative override
pub async fn set_capacity_override(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(duty_slot_id): Path<String>,
    Json(req): Json<CapacityOverrideRequest>,
) -> ApiResult<Json<DutySlotResponse>> {
    let actor = actor_id(&headers)?;

    let slot = state
        .capacity_override_service
        .set_override(&duty_slot_id, req.manual_capacity_override, &actor)
        .await?;

    Ok(Json(DutySlotResponse::from(slot)))
}
