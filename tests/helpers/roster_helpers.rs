use async_trait::async_trait;
use dutyroster::application::services::{
    AssignmentEngine, BatchCoordinator, CancellationService, CapacityOverrideService,
    RetryPolicy, WaitlistPromoter,
};
use dutyroster::domain::entities::{Drive, DutySlot, Registration};
use dutyroster::domain::ports::assignment_store::AssignmentStore;
use dutyroster::domain::ports::eligibility::{AdmitAll, EligibilityPolicy};
use dutyroster::domain::ports::event_bus::EventBus;
use dutyroster::infrastructure::http::middleware::{ApiError, ApiResult};
use dutyroster::infrastructure::persistence::Database;
use dutyroster::shared::events::LocalEventBus;
use sqlx::Row;
use std::sync::Arc;
use std::time::Duration;

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(5, Duration::from_millis(5))
}

pub fn store_of(db: &Database) -> Arc<dyn AssignmentStore> {
    Arc::new(db.clone())
}

pub fn engine_for(store: Arc<dyn AssignmentStore>) -> AssignmentEngine {
    AssignmentEngine::new(store, Arc::new(AdmitAll), fast_retry())
}

pub fn engine_with_eligibility(
    store: Arc<dyn AssignmentStore>,
    eligibility: Arc<dyn EligibilityPolicy>,
) -> AssignmentEngine {
    AssignmentEngine::new(store, eligibility, fast_retry())
}

pub fn promoter_for(store: Arc<dyn AssignmentStore>) -> WaitlistPromoter {
    WaitlistPromoter::new(store, fast_retry())
}

pub fn batch_for(store: Arc<dyn AssignmentStore>) -> BatchCoordinator {
    BatchCoordinator::new(store.clone(), engine_for(store))
}

pub fn cancellation_for(
    store: Arc<dyn AssignmentStore>,
    event_bus: Arc<dyn EventBus>,
) -> CancellationService {
    CancellationService::new(store, event_bus, fast_retry())
}

pub fn capacity_override_for(
    store: Arc<dyn AssignmentStore>,
    event_bus: Arc<dyn EventBus>,
) -> CapacityOverrideService {
    CapacityOverrideService::new(store, event_bus)
}

pub fn event_bus() -> Arc<dyn EventBus> {
    Arc::new(LocalEventBus::new(64))
}

pub async fn create_test_drive(db: &Database, name: &str) -> Drive {
    let drive = Drive::new(name.to_string());
    db.insert_drive(&drive).await.expect("Failed to create drive");
    drive
}

pub async fn create_test_slot(
    db: &Database,
    drive_id: &str,
    name: &str,
    base_capacity: u32,
    sort_order: i64,
) -> DutySlot {
    let slot = DutySlot::new(drive_id.to_string(), name.to_string(), base_capacity, sort_order);
    db.insert_duty_slot(&slot)
        .await
        .expect("Failed to create duty slot");
    slot
}

/// Registers `count` volunteers named `<prefix>-01`, `<prefix>-02`, ... in that order
pub async fn register_volunteers(
    db: &Database,
    drive_id: &str,
    prefix: &str,
    count: usize,
) -> Vec<String> {
    let mut volunteers = Vec::with_capacity(count);
    for i in 1..=count {
        let volunteer_id = format!("{}-{:02}", prefix, i);
        register_volunteer(db, drive_id, &volunteer_id).await;
        volunteers.push(volunteer_id);
    }
    volunteers
}

pub async fn register_volunteer(db: &Database, drive_id: &str, volunteer_id: &str) {
    db.insert_registration(&Registration::new(
        drive_id.to_string(),
        volunteer_id.to_string(),
    ))
    .await
    .expect("Failed to register volunteer");
}

pub async fn count_rows(db: &Database, volunteer_id: &str, drive_id: &str) -> i64 {
    let row = sqlx::query(
        "SELECT COUNT(*) AS total FROM assignments WHERE volunteer_id = ? AND drive_id = ?",
    )
    .bind(volunteer_id)
    .bind(drive_id)
    .fetch_one(db.pool())
    .await
    .expect("Failed to count assignments");
    row.try_get("total").expect("Missing total column")
}

pub async fn count_status(db: &Database, duty_slot_id: &str, status: &str) -> i64 {
    let row = sqlx::query(
        "SELECT COUNT(*) AS total FROM assignments WHERE duty_slot_id = ? AND status = ?",
    )
    .bind(duty_slot_id)
    .bind(status)
    .fetch_one(db.pool())
    .await
    .expect("Failed to count assignments");
    row.try_get("total").expect("Missing total column")
}

/// Admits only the named duty slots
pub struct OnlySlots(pub Vec<String>);

#[async_trait]
impl EligibilityPolicy for OnlySlots {
    async fn admits(&self, _volunteer_id: &str, slot: &DutySlot) -> ApiResult<bool> {
        Ok(self.0.iter().any(|name| name == &slot.name))
    }
}

/// Eligibility lookup that errors for one volunteer
pub struct BrokenFor(pub String);

#[async_trait]
impl EligibilityPolicy for BrokenFor {
    async fn admits(&self, volunteer_id: &str, _slot: &DutySlot) -> ApiResult<bool> {
        if volunteer_id == self.0 {
            Err(ApiError::Internal(format!(
                "Eligibility lookup failed for {}",
                volunteer_id
            )))
        } else {
            Ok(true)
        }
    }
}
