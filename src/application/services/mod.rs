pub mod assignment_engine;
pub mod batch_coordinator;
pub mod cancellation_service;
pub mod capacity_override_service;
pub mod capacity_resolver;
pub mod retry;
pub mod waitlist_promoter;

pub use assignment_engine::*;
pub use batch_coordinator::*;
pub use cancellation_service::*;
pub use capacity_override_service::*;
pub use capacity_resolver::*;
pub use retry::*;
pub use waitlist_promoter::*;
