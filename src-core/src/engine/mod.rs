//! Engine Layer
//!
//! The bowl rules. Every function takes a bowl snapshot and returns the
//! next state (or why not); nothing here touches storage.

mod access;
mod manage;
mod resolve;
mod submit;

pub use access::{ensure_can_resolve, ensure_owner};
pub use manage::{authorize_delete_bowl, clear_entries, coerce_limit, create_bowl, delete_entry};
pub use resolve::{resolve, SECRET_SANTA_HEADER};
pub use submit::{add_member_if_absent, append_entry, submit_entry};
