//! Storage management for HangarBay

mod ledger;
pub mod paths;

pub use ledger::*;
pub use paths::*;
