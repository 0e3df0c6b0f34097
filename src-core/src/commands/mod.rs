//! Commands Layer
//!
//! Command handlers that bridge the front end to the engine and stores.

mod bowl_cmd;
mod link_cmd;
mod session_cmd;

pub use bowl_cmd::*;
pub use link_cmd::*;
pub use session_cmd::*;
