pub mod assignment;
pub mod drive;
pub mod duty_slot;
pub mod outcome;

pub use assignment::*;
pub use drive::*;
pub use duty_slot::*;
pub use outcome::*;
