//! Core data types for the marketplace
//!
//! # Components
//!
//! - `error` - Error taxonomy (decode errors, market errors)
//! - `user` - Account records and account type codes
//! - `game` - Inventory listings and ownership records

pub mod error;
pub mod game;
pub mod user;

pub use error::{DecodeError, MarketError};
pub use game::{InventoryRecord, OwnershipRecord};
pub use user::{UserRecord, UserType};
