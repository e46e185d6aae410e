//! Daily transaction log
//!
//! An append-only event log reusing the fixed-width field conventions of the
//! record stores. One line per event: a two-character event code, a space,
//! then event-specific fixed-width fields separated by single spaces.
//!
//! Events are buffered in memory during a session and flushed to disk at
//! logout (after the closing end-of-session event) and at program exit.
//! Unlike the record stores the log is never rewritten: flushing opens the
//! file in append mode.

use crate::io::layout::{render_amount, FieldSpec};
use crate::types::{InventoryRecord, UserRecord};
use rust_decimal::Decimal;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Event codes written to the daily transaction log
///
/// The delete-user event and the purchase credit transfer carry distinct
/// codes (02 and 07).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCode {
    /// End-of-session snapshot of the logged-out account
    EndOfSession,
    /// A new account was created
    CreateUser,
    /// An account was deleted
    DeleteUser,
    /// A game was listed for sale
    Sell,
    /// A game was purchased
    Buy,
    /// An admin moved credit from a seller back to a buyer
    Refund,
    /// Credit was added to an account
    AddCredit,
    /// Credit moved from buyer to seller as part of a purchase
    CreditTransfer,
}

impl EventCode {
    /// The two-character code opening the log line
    pub fn code(self) -> &'static str {
        match self {
            EventCode::EndOfSession => "00",
            EventCode::CreateUser => "01",
            EventCode::DeleteUser => "02",
            EventCode::Sell => "03",
            EventCode::Buy => "04",
            EventCode::Refund => "05",
            EventCode::AddCredit => "06",
            EventCode::CreditTransfer => "07",
        }
    }
}

// Field widths shared with the record stores' canonical tables.
const USERNAME: FieldSpec = FieldSpec::left("username", 16, '_');
const TYPE: FieldSpec = FieldSpec::left("type", 2, '_');
const GAME: FieldSpec = FieldSpec::left("game_name", 26, '_');
const CREDIT: FieldSpec = FieldSpec::right("credit", 9, '0');
const PRICE: FieldSpec = FieldSpec::right("price", 6, '0');

/// Buffered writer for the daily transaction log
#[derive(Debug)]
pub struct TransactionLog {
    path: PathBuf,
    pending: Vec<String>,
}

impl TransactionLog {
    /// Create a log writer; the file is created on first flush
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TransactionLog {
            path: path.into(),
            pending: Vec::new(),
        }
    }

    /// The log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines buffered but not yet flushed
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Buffer an account-shaped event (codes 00, 01, 02, 06)
    ///
    /// Line format: `CC username(16) TT credit(9)`.
    pub fn push_user_event(&mut self, code: EventCode, user: &UserRecord) {
        self.pending.push(format!(
            "{} {} {} {}",
            code.code(),
            USERNAME.render(&user.username),
            TYPE.render(user.user_type.code()),
            CREDIT.render(&render_amount(user.credit)),
        ));
    }

    /// Buffer a sell event (code 03)
    ///
    /// Line format: `03 game(26) seller(16) price(6)`.
    pub fn push_sell(&mut self, listing: &InventoryRecord) {
        self.pending.push(format!(
            "{} {} {} {}",
            EventCode::Sell.code(),
            GAME.render(&listing.game_name),
            USERNAME.render(&listing.seller),
            PRICE.render(&render_amount(listing.price)),
        ));
    }

    /// Buffer a buy event (code 04)
    ///
    /// Line format: `04 game(26) seller(16) buyer(16) price(6)`.
    pub fn push_buy(&mut self, listing: &InventoryRecord, buyer: &str) {
        self.pending.push(format!(
            "{} {} {} {} {}",
            EventCode::Buy.code(),
            GAME.render(&listing.game_name),
            USERNAME.render(&listing.seller),
            USERNAME.render(buyer),
            PRICE.render(&render_amount(listing.price)),
        ));
    }

    /// Buffer a credit-movement event (codes 05 and 07)
    ///
    /// Line format: `CC to(16) from(16) amount(9)`. Refunds flow seller to
    /// buyer; purchase transfers flow buyer to seller.
    pub fn push_credit_movement(
        &mut self,
        code: EventCode,
        to: &str,
        from: &str,
        amount: Decimal,
    ) {
        self.pending.push(format!(
            "{} {} {} {}",
            code.code(),
            USERNAME.render(to),
            USERNAME.render(from),
            CREDIT.render(&render_amount(amount)),
        ));
    }

    /// Append all buffered events to the log file and clear the buffer
    ///
    /// A no-op when nothing is pending. On failure the buffer is left
    /// intact so a later flush can retry.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for line in &self.pending {
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.flush()?;
        self.pending.clear();
        Ok(())
    }
}
