//! Installation dispatcher and its helpers

mod archive;
mod dispatcher;
mod download;
mod events;
mod http;
mod process;

pub use archive::*;
pub use dispatcher::*;
pub use download::*;
pub use events::*;
pub use http::*;
pub use process::*;
