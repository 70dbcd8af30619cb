#![allow(unused_imports, dead_code)]
pub mod fault_store;
pub mod roster_helpers;
pub mod test_db;

pub use fault_store::*;
pub use roster_helpers::*;
pub use test_db::*;
