//! Repository Layer
//!
//! Data access abstractions and implementations.

mod bowl_repo;
mod db;
mod device_repo;
mod memory;
mod traits;


pub use bowl_repo::SqliteBowlRepository;
pub use db::{init_db, DbState};
pub use device_repo::SqliteDeviceStore;
pub use memory::{InMemoryBowlRepository, InMemoryDeviceStore};
pub use traits::{keys, BowlRepository, BowlSnapshot, DeviceStore};
