use crate::application::listeners::spawn_promotion_listener;
use crate::application::services::*;
use crate::config::Config;
use crate::domain::ports::assignment_store::AssignmentStore;
use crate::domain::ports::eligibility::{AdmitAll, EligibilityPolicy};
use crate::domain::ports::event_bus::EventBus;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::persistence::{Database, TimedStore};
use crate::shared::events::LocalEventBus;
use std::sync::Arc;
use std::time::Duration;

/// Wires the services over the database and starts the promotion listener
pub async fn build_app_state(
    db: Database,
    config: &Config,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let eligibility: Arc<dyn EligibilityPolicy> = Arc::new(AdmitAll);
    build_app_state_with_eligibility(db, config, eligibility).await
}

pub async fn build_app_state_with_eligibility(
    db: Database,
    config: &Config,
    eligibility: Arc<dyn EligibilityPolicy>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let store: Arc<dyn AssignmentStore> = Arc::new(TimedStore::new(
        Arc::new(db) as Arc<dyn AssignmentStore>,
        config.store_timeout(),
    ));
    tracing::info!(
        "Assignment store initialized with {}ms call timeout",
        config.store_timeout_ms
    );

    let event_bus: Arc<dyn EventBus> = Arc::new(LocalEventBus::new(config.event_bus_capacity));
    tracing::info!(
        "Event bus initialized with capacity {}",
        config.event_bus_capacity
    );

    let retry = RetryPolicy::new(config.max_conflict_retries, Duration::from_millis(50));

    let assignment_engine = AssignmentEngine::new(store.clone(), eligibility, retry);
    let batch_coordinator = BatchCoordinator::new(store.clone(), assignment_engine.clone());
    let cancellation_service = CancellationService::new(store.clone(), event_bus.clone(), retry);
    let capacity_override_service = CapacityOverrideService::new(store.clone(), event_bus.clone());
    let waitlist_promoter = WaitlistPromoter::new(store, retry);

    spawn_promotion_listener(event_bus.clone(), waitlist_promoter);

    Ok(AppState {
        assignment_engine,
        batch_coordinator,
        cancellation_service,
        capacity_override_service,
        event_bus,
    })
}
