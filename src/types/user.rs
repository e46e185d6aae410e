//! User account types
//!
//! Defines the account record stored in the user accounts file and the
//! account type codes that gate what a logged-in user may do.

use rust_decimal::Decimal;

/// Account types supported by the marketplace
///
/// Each variant maps to a two-character code in the accounts file. The type
/// determines which marketplace operations the account may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    /// Administrator: full access plus account management and refunds
    Admin,

    /// Full standard user: may both buy and sell
    FullStandard,

    /// Buy-only standard user
    BuyStandard,

    /// Sell-only standard user
    SellStandard,
}

impl UserType {
    /// The two-character code stored in the accounts file
    pub fn code(self) -> &'static str {
        match self {
            UserType::Admin => "AA",
            UserType::FullStandard => "FS",
            UserType::BuyStandard => "BS",
            UserType::SellStandard => "SS",
        }
    }

    /// Map a file code back to a user type
    ///
    /// Returns `None` for codes outside the known set, which the codec
    /// reports as a bad field.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "AA" => Some(UserType::Admin),
            "FS" => Some(UserType::FullStandard),
            "BS" => Some(UserType::BuyStandard),
            "SS" => Some(UserType::SellStandard),
            _ => None,
        }
    }

    /// Human-readable name for account listings
    pub fn display_name(self) -> &'static str {
        match self {
            UserType::Admin => "Admin",
            UserType::FullStandard => "Full-Standard",
            UserType::BuyStandard => "Buy-Standard",
            UserType::SellStandard => "Sell-Standard",
        }
    }

    /// Whether this account type may purchase games
    pub fn can_buy(self) -> bool {
        matches!(
            self,
            UserType::Admin | UserType::FullStandard | UserType::BuyStandard
        )
    }

    /// Whether this account type may list games for sale
    pub fn can_sell(self) -> bool {
        matches!(
            self,
            UserType::Admin | UserType::FullStandard | UserType::SellStandard
        )
    }

    /// Whether this account type may manage accounts and issue refunds
    pub fn is_admin(self) -> bool {
        matches!(self, UserType::Admin)
    }
}

/// One account record from the user accounts file
///
/// The username is the record's key and is unique within the store; the
/// business layer enforces uniqueness before appending, the store does not.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Account name, at most 15 characters, validated upstream to exclude
    /// pad characters
    pub username: String,

    /// Account type code
    pub user_type: UserType,

    /// Credit balance, within [0, 999999.99], two decimal places
    pub credit: Decimal,
}

impl UserRecord {
    /// Create a new account record
    pub fn new(username: impl Into<String>, user_type: UserType, credit: Decimal) -> Self {
        UserRecord {
            username: username.into(),
            user_type,
            credit,
        }
    }
}
