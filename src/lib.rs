//! Console game marketplace over fixed-width flat-file record stores.
//!
//! Accounts, inventory listings, and game ownership each live in their own
//! text file of fixed-width lines terminated by an `END` sentinel. Every
//! mutation rewrites the whole file through a temp-file-and-rename protocol,
//! so a store file is always either its old or its new contents.
//!
//! The crate is layered bottom-up:
//!
//! - [`io`]: field layouts, the record codec, and the sentinel-file
//!   rewrite protocol.
//! - [`types`]: the three record types and the error taxonomy.
//! - [`core`]: the generic [`core::RecordStore`], the session state, the
//!   daily transaction log, and the [`core::Marketplace`] engine holding
//!   all business rules.
//! - [`cli`]: argument parsing and the interactive command loop.

pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use crate::core::{Marketplace, RecordStore, Session};
pub use crate::types::{InventoryRecord, MarketError, OwnershipRecord, UserRecord, UserType};
