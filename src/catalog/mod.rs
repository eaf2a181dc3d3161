//! Catalog parsing and validation for HangarBay app entries

mod parser;
mod schema;
mod validate;

pub use parser::*;
pub use schema::*;
pub use validate::*;
