//! Record codecs: typed records to fixed-width lines and back
//!
//! The `FixedWidthRecord` trait binds a record type to its canonical field
//! table and key, and is the seam the generic record store is written
//! against. Encoding and decoding are pure and stateless; all I/O lives in
//! the sentinel file layer.
//!
//! # Canonical width tables
//!
//! | Record | Fields | Total |
//! |---|---|---|
//! | UserRecord | username 16 / type 2 / credit 9 | 27 |
//! | InventoryRecord | game 26 / seller 16 / price 6 | 48 |
//! | OwnershipRecord | game 26 / owner 16 | 42 |
//!
//! Names are left-aligned and `_`-padded, amounts right-aligned and
//! `0`-padded with exactly two decimal digits.

use crate::io::layout::{render_amount, FieldSpec, RecordLayout};
use crate::types::{DecodeError, InventoryRecord, OwnershipRecord, UserRecord, UserType};
use rust_decimal::Decimal;
use std::str::FromStr;

/// A record type storable in a sentinel-terminated fixed-width file
///
/// Implementations bind the concrete field table, the encode/decode pair,
/// and the key identifying a record within its store.
pub trait FixedWidthRecord: Sized {
    /// The record's field table, in on-disk order
    const LAYOUT: RecordLayout;

    /// The key uniquely identifying a record within its store
    type Key: PartialEq;

    /// Render the record as one fixed-width line (no trailing newline)
    fn encode(&self) -> String;

    /// Decode one fixed-width line
    ///
    /// Fails with [`DecodeError::BadLength`] if the line is not exactly the
    /// layout's total width, and [`DecodeError::BadField`] if a numeric
    /// field does not parse or a type code is unknown.
    fn decode(line: &str) -> Result<Self, DecodeError>;

    /// Extract the record's key
    fn key(&self) -> Self::Key;

    /// The sentinel line terminating this record type's store file
    fn sentinel_line() -> String {
        Self::LAYOUT.sentinel_line()
    }

    /// Whether a raw line is this record type's sentinel
    fn is_sentinel(line: &str) -> bool {
        Self::LAYOUT.is_sentinel(line)
    }
}

/// Parse a zero-padded amount field
///
/// `Decimal` accepts leading zeros, so the raw slice parses as written and
/// no pad stripping is needed (stripping could leave a bare `.00`).
fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, DecodeError> {
    Decimal::from_str(raw).map_err(|_| DecodeError::bad_field(field, raw))
}

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::left("username", 16, '_'),
    FieldSpec::left("type", 2, '_'),
    FieldSpec::right("credit", 9, '0'),
];

impl FixedWidthRecord for UserRecord {
    const LAYOUT: RecordLayout = RecordLayout::new(USER_FIELDS);

    type Key = String;

    fn encode(&self) -> String {
        let fields = Self::LAYOUT.fields;
        let mut line = String::with_capacity(Self::LAYOUT.total_width());
        line.push_str(&fields[0].render(&self.username));
        line.push_str(&fields[1].render(self.user_type.code()));
        line.push_str(&fields[2].render(&render_amount(self.credit)));
        line
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let raw = Self::LAYOUT.slice(line)?;
        let fields = Self::LAYOUT.fields;
        let username = fields[0].strip(raw[0]).to_string();
        let user_type =
            UserType::from_code(raw[1]).ok_or_else(|| DecodeError::bad_field("type", raw[1]))?;
        let credit = parse_amount("credit", raw[2])?;
        Ok(UserRecord {
            username,
            user_type,
            credit,
        })
    }

    fn key(&self) -> String {
        self.username.clone()
    }
}

const INVENTORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::left("game_name", 26, '_'),
    FieldSpec::left("seller", 16, '_'),
    FieldSpec::right("price", 6, '0'),
];

impl FixedWidthRecord for InventoryRecord {
    const LAYOUT: RecordLayout = RecordLayout::new(INVENTORY_FIELDS);

    /// (game name, seller username)
    type Key = (String, String);

    fn encode(&self) -> String {
        let fields = Self::LAYOUT.fields;
        let mut line = String::with_capacity(Self::LAYOUT.total_width());
        line.push_str(&fields[0].render(&self.game_name));
        line.push_str(&fields[1].render(&self.seller));
        line.push_str(&fields[2].render(&render_amount(self.price)));
        line
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let raw = Self::LAYOUT.slice(line)?;
        let fields = Self::LAYOUT.fields;
        let game_name = fields[0].strip(raw[0]).to_string();
        let seller = fields[1].strip(raw[1]).to_string();
        let price = parse_amount("price", raw[2])?;
        Ok(InventoryRecord {
            game_name,
            seller,
            price,
        })
    }

    fn key(&self) -> (String, String) {
        (self.game_name.clone(), self.seller.clone())
    }
}

const OWNERSHIP_FIELDS: &[FieldSpec] = &[
    FieldSpec::left("game_name", 26, '_'),
    FieldSpec::left("owner", 16, '_'),
];

impl FixedWidthRecord for OwnershipRecord {
    const LAYOUT: RecordLayout = RecordLayout::new(OWNERSHIP_FIELDS);

    /// (game name, owner username)
    type Key = (String, String);

    fn encode(&self) -> String {
        let fields = Self::LAYOUT.fields;
        let mut line = String::with_capacity(Self::LAYOUT.total_width());
        line.push_str(&fields[0].render(&self.game_name));
        line.push_str(&fields[1].render(&self.owner));
        line
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let raw = Self::LAYOUT.slice(line)?;
        let fields = Self::LAYOUT.fields;
        let game_name = fields[0].strip(raw[0]).to_string();
        let owner = fields[1].strip(raw[1]).to_string();
        Ok(OwnershipRecord { game_name, owner })
    }

    fn key(&self) -> (String, String) {
        (self.game_name.clone(), self.owner.clone())
    }
}
