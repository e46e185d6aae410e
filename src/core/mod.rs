//! Core business logic module
//!
//! - `record_store` - Generic typed CRUD over a sentinel-terminated file
//! - `session` - Explicit login-session state
//! - `marketplace` - Command orchestration and business rules
//! - `tx_log` - Buffered append-only daily transaction log

pub mod marketplace;
pub mod record_store;
pub mod session;
pub mod tx_log;

pub use marketplace::Marketplace;
pub use record_store::RecordStore;
pub use session::Session;
pub use tx_log::{EventCode, TransactionLog};
