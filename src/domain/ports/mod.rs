pub mod assignment_store;
pub mod eligibility;
pub mod event_bus;
