//! I/O module
//!
//! The fixed-width flat-file layer.
//!
//! # Components
//!
//! - `layout` - Pure fixed-width field machinery (widths, padding, sentinel)
//! - `codec` - Typed record encode/decode against the canonical layouts
//! - `sentinel_file` - On-disk byte layout and the rewrite-via-temp-file
//!   protocol

pub mod codec;
pub mod layout;
pub mod sentinel_file;

pub use codec::FixedWidthRecord;
pub use layout::{Alignment, FieldSpec, RecordLayout};
pub use sentinel_file::SentinelFile;
