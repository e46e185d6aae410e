//! Fixed-width field layout machinery
//!
//! This module centralizes the byte layout of the flat-file stores,
//! providing:
//! - FieldSpec: width, alignment, and pad character of one field
//! - RecordLayout: the ordered field table of one record type, with
//!   cumulative-offset slicing and sentinel construction
//! - Money rendering at exactly two decimal digits
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Layout rules
//!
//! Fields are concatenated with no separator: the padding itself performs
//! separation, since pad characters never appear in validated field values.
//! Left-aligned fields carry trailing pad characters, right-aligned fields
//! leading ones. The sentinel line is the literal `END` followed by the
//! record's pad character up to the record's total width.

use crate::types::DecodeError;
use rust_decimal::Decimal;

/// Literal text opening every sentinel line
pub const SENTINEL_TAG: &str = "END";

/// Horizontal alignment of a field value within its width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Value at the left edge, pad characters trail
    Left,
    /// Value at the right edge, pad characters lead
    Right,
}

/// Width, alignment, and pad character of one fixed-width field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used in decode diagnostics
    pub name: &'static str,
    /// Exact character width on disk
    pub width: usize,
    /// Which edge the value sits on
    pub align: Alignment,
    /// Character filling the unused width
    pub pad: char,
}

impl FieldSpec {
    /// A left-aligned field (names), padded on the right
    pub const fn left(name: &'static str, width: usize, pad: char) -> Self {
        FieldSpec {
            name,
            width,
            align: Alignment::Left,
            pad,
        }
    }

    /// A right-aligned field (amounts), padded on the left
    pub const fn right(name: &'static str, width: usize, pad: char) -> Self {
        FieldSpec {
            name,
            width,
            align: Alignment::Right,
            pad,
        }
    }

    /// Render a value at this field's exact width
    ///
    /// Values shorter than the width are padded on the appropriate edge;
    /// values longer than the width are truncated to it. Validated values
    /// never need truncation, it only bounds what malformed input can do.
    pub fn render(&self, value: &str) -> String {
        if value.len() >= self.width {
            return value[..self.width].to_string();
        }
        let padding: String = std::iter::repeat(self.pad)
            .take(self.width - value.len())
            .collect();
        match self.align {
            Alignment::Left => format!("{value}{padding}"),
            Alignment::Right => format!("{padding}{value}"),
        }
    }

    /// Strip pad characters from the raw field contents
    ///
    /// Trailing pads are removed from left-aligned fields, leading pads from
    /// right-aligned ones. Real values never contain the pad character, so
    /// this is lossless.
    pub fn strip<'a>(&self, raw: &'a str) -> &'a str {
        match self.align {
            Alignment::Left => raw.trim_end_matches(self.pad),
            Alignment::Right => raw.trim_start_matches(self.pad),
        }
    }
}

/// The ordered field table of one record type
#[derive(Debug, Clone, Copy)]
pub struct RecordLayout {
    /// Fields in on-disk order
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    /// Create a layout from a static field table
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        RecordLayout { fields }
    }

    /// Total character width of one record line
    pub fn total_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// The sentinel line for this record type
    ///
    /// `END` padded to the total width with the record's pad character
    /// (taken from the first field).
    pub fn sentinel_line(&self) -> String {
        let pad = self.fields[0].pad;
        let mut line = String::with_capacity(self.total_width());
        line.push_str(SENTINEL_TAG);
        while line.len() < self.total_width() {
            line.push(pad);
        }
        line
    }

    /// Whether a raw line is exactly this record type's sentinel
    pub fn is_sentinel(&self, line: &str) -> bool {
        line == self.sentinel_line()
    }

    /// Slice a line at the cumulative field-width offsets
    ///
    /// Returns one raw (unstripped) slice per field, in declared order.
    /// Fails with `BadLength` if the line is not exactly the total width.
    pub fn slice<'a>(&self, line: &'a str) -> Result<Vec<&'a str>, DecodeError> {
        if line.len() != self.total_width() {
            return Err(DecodeError::bad_length(self.total_width(), line.len()));
        }
        let mut slices = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        for field in self.fields {
            let raw = line
                .get(offset..offset + field.width)
                .ok_or_else(|| DecodeError::bad_field(field.name, line))?;
            slices.push(raw);
            offset += field.width;
        }
        Ok(slices)
    }
}

/// Render a monetary amount with exactly two decimal digits
///
/// Amount fields are rendered this way before the field's zero padding is
/// applied, so `100` and `100.000` both land on disk as `100.00`.
pub fn render_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}
