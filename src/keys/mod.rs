//! Key redemption ledger.
//!
//! - [`duration`]: duration expressions (`24hr`, `7day`, `L`) to expirations
//! - [`record`]: the `KeyRecord` and its `Expiration`
//! - [`store`]: durable backends (`JsonFileStore`, `MemoryStore`)
//! - [`ledger`]: the `Ledger` owning records and their persistence
//! - [`sweeper`]: periodic removal of expired records

pub mod duration;
pub mod ledger;
pub mod record;
pub mod store;
pub mod sweeper;

pub use duration::{LIFETIME_TOKEN, latest_expiration, parse_expiration};
pub use ledger::Ledger;
pub use record::{Expiration, KeyRecord};
pub use store::{JsonFileStore, KeyStore, MemoryStore};
pub use sweeper::{run_sweep, spawn_sweep_task};
