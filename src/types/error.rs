//! Error types for the marketplace
//!
//! Two levels of failure exist in the system:
//!
//! - **Decode errors**: a single fixed-width line could not be turned into a
//!   record. These are recovered locally - the offending line is skipped with
//!   a diagnostic and loading continues.
//! - **Market errors**: everything surfaced to the command loop: I/O failures
//!   from store operations (which never partially mutate the backing file)
//!   and business-rule violations. The interactive loop prints the message
//!   and continues; only unrecoverable startup I/O terminates the process.
//!
//! "Not found" is deliberately absent from this taxonomy: deleting or
//! updating a missing key yields a zero count, which the business layer maps
//! to a user-facing message itself.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure to decode one fixed-width line into a record
///
/// Decode errors are recoverable: the store skips the line and keeps
/// scanning, tolerating legacy or malformed data in the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The line length does not equal the record's total fixed width
    #[error("bad line length: expected {expected} characters, got {actual}")]
    BadLength {
        /// The record type's total width
        expected: usize,
        /// The actual line length
        actual: usize,
    },

    /// A field could not be interpreted
    ///
    /// Covers numeric fields that fail to parse and type-code fields that
    /// do not map to a known enumerant.
    #[error("bad value '{value}' in field '{field}'")]
    BadField {
        /// Name of the offending field
        field: &'static str,
        /// The raw field contents, pad characters included
        value: String,
    },
}

impl DecodeError {
    /// Create a BadLength error
    pub fn bad_length(expected: usize, actual: usize) -> Self {
        DecodeError::BadLength { expected, actual }
    }

    /// Create a BadField error
    pub fn bad_field(field: &'static str, value: &str) -> Self {
        DecodeError::BadField {
            field,
            value: value.to_string(),
        }
    }
}

/// Main error type for the marketplace
///
/// Each variant carries enough context to print a human-readable message to
/// the interactive user. Store operations only ever produce the I/O
/// variant; everything else comes from the business-rule layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    /// A store file could not be read or replaced
    ///
    /// The rewrite protocol guarantees the original file is untouched when
    /// this is returned.
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// Path of the affected store file
        path: String,
        /// Description of the underlying failure
        message: String,
    },

    /// No account with the given username exists
    #[error("user '{username}' does not exist")]
    UnknownUser {
        /// The missing username
        username: String,
    },

    /// An account with the given username already exists
    #[error("user '{username}' already exists")]
    DuplicateUser {
        /// The duplicated username
        username: String,
    },

    /// A listing with the given game name and seller already exists
    #[error("'{game}' is already listed by '{seller}'")]
    DuplicateListing {
        /// Game name
        game: String,
        /// Seller username
        seller: String,
    },

    /// No listing with the given game name and seller exists
    #[error("'{game}' is not listed by '{seller}'")]
    UnknownListing {
        /// Game name
        game: String,
        /// Seller username
        seller: String,
    },

    /// The buyer does not have enough credit for the purchase
    #[error("insufficient credit for '{username}': available {available}, required {required}")]
    InsufficientCredit {
        /// Buyer username
        username: String,
        /// Current credit balance
        available: Decimal,
        /// Amount the operation requires
        required: Decimal,
    },

    /// The logged-in account type may not perform this operation
    #[error("'{username}' is not permitted to {operation}")]
    NotPermitted {
        /// Acting username
        username: String,
        /// Operation that was refused
        operation: String,
    },

    /// A monetary amount is outside its allowed range
    #[error("invalid amount {amount} for {what}: allowed range {min} to {max}")]
    AmountOutOfRange {
        /// What the amount was for ("price", "credit", ...)
        what: String,
        /// The rejected amount
        amount: Decimal,
        /// Lower bound, inclusive
        min: Decimal,
        /// Upper bound, inclusive
        max: Decimal,
    },

    /// A name is empty, too long, or contains a pad character
    #[error("invalid {what} '{value}': {reason}")]
    InvalidName {
        /// What kind of name ("username", "game name")
        what: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The buyer already owns the game
    #[error("'{username}' already owns '{game}'")]
    AlreadyOwned {
        /// Buyer username
        username: String,
        /// Game name
        game: String,
    },

    /// A user tried to buy their own listing
    #[error("'{username}' cannot buy their own listing '{game}'")]
    OwnListing {
        /// Acting username
        username: String,
        /// Game name
        game: String,
    },

    /// The per-session added-credit cap would be exceeded
    #[error(
        "adding {requested} exceeds the session credit limit: {added} of {limit} already added"
    )]
    SessionCreditLimit {
        /// Amount requested now
        requested: Decimal,
        /// Amount already added this session
        added: Decimal,
        /// The per-session cap
        limit: Decimal,
    },

    /// A command line could not be understood
    #[error("unrecognized command '{input}'")]
    UnknownCommand {
        /// The raw input
        input: String,
    },

    /// A command was given the wrong arguments
    #[error("usage: {usage}")]
    BadUsage {
        /// The expected form of the command
        usage: &'static str,
    },
}

// Helper constructors for the errors built in several places.

impl MarketError {
    /// Create an Io error for a store file path
    pub fn io(path: &std::path::Path, error: &std::io::Error) -> Self {
        MarketError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    /// Create an UnknownUser error
    pub fn unknown_user(username: &str) -> Self {
        MarketError::UnknownUser {
            username: username.to_string(),
        }
    }

    /// Create a DuplicateUser error
    pub fn duplicate_user(username: &str) -> Self {
        MarketError::DuplicateUser {
            username: username.to_string(),
        }
    }

    /// Create a NotPermitted error
    pub fn not_permitted(username: &str, operation: &str) -> Self {
        MarketError::NotPermitted {
            username: username.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create an InsufficientCredit error
    pub fn insufficient_credit(username: &str, available: Decimal, required: Decimal) -> Self {
        MarketError::InsufficientCredit {
            username: username.to_string(),
            available,
            required,
        }
    }

    /// Create an AmountOutOfRange error
    pub fn amount_out_of_range(what: &str, amount: Decimal, min: Decimal, max: Decimal) -> Self {
        MarketError::AmountOutOfRange {
            what: what.to_string(),
            amount,
            min,
            max,
        }
    }

    /// Create an InvalidName error
    pub fn invalid_name(what: &'static str, value: &str, reason: &str) -> Self {
        MarketError::InvalidName {
            what,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
