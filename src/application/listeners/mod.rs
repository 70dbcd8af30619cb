pub mod promotion;

pub use promotion::*;
