use crate::application::services::{
    AssignmentEngine, BatchCoordinator, CancellationService, CapacityOverrideService,
};
use crate::domain::ports::event_bus::EventBus;
use std::sync::Arc;

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub assignment_engine: AssignmentEngine,
    pub batch_coordinator: BatchCoordinator,
    pub cancellation_service: CancellationService,
    pub capacity_override_service: CapacityOverrideService,
    pub event_bus: Arc<dyn EventBus>,
}
