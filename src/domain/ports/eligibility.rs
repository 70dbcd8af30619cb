use crate::domain::entities::DutySlot;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Decides which duty slots a volunteer may be placed on.
///
/// The matching rules (skills, gender, stated preference) belong to the caller;
/// the engine only consumes the verdict.
#[async_trait]
pub trait EligibilityPolicy: Send + Sync {
    async fn admits(&self, volunteer_id: &str, slot: &DutySlot) -> ApiResult<bool>;
}

/// Every slot of the drive is a candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

#[async_trait]
impl EligibilityPolicy for AdmitAll {
    async fn admits(&self, _volunteer_id: &str, _slot: &DutySlot) -> ApiResult<bool> {
        Ok(true)
    }
}
