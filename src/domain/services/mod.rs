pub mod assignment_transitions;
pub mod capacity;

pub use assignment_transitions::*;
pub use capacity::*;
