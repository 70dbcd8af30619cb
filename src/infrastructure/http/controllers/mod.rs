pub mod assignments;
pub mod duty_slots;
