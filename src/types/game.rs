//! Game listing and ownership types
//!
//! Defines the two game-related records: inventory listings (a game offered
//! for sale by a seller) and ownership records (a game held in a user's
//! collection). Both are keyed by a game-name/username pair.

use rust_decimal::Decimal;

/// One listing from the game inventory file
///
/// Keyed by (game name, seller username): the same title may be listed by
/// several sellers, but only once per seller.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    /// Game title, at most 25 characters, validated upstream to exclude
    /// pad characters
    pub game_name: String,

    /// Username of the listing seller
    pub seller: String,

    /// Asking price, within [0.01, 999.99], two decimal places
    pub price: Decimal,
}

impl InventoryRecord {
    /// Create a new listing
    pub fn new(game_name: impl Into<String>, seller: impl Into<String>, price: Decimal) -> Self {
        InventoryRecord {
            game_name: game_name.into(),
            seller: seller.into(),
            price,
        }
    }
}

/// One record from the games-collection (ownership) file
///
/// Keyed by (game name, owner username); a user owns any given title at
/// most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRecord {
    /// Game title
    pub game_name: String,

    /// Username of the owner
    pub owner: String,
}

impl OwnershipRecord {
    /// Create a new ownership record
    pub fn new(game_name: impl Into<String>, owner: impl Into<String>) -> Self {
        OwnershipRecord {
            game_name: game_name.into(),
            owner: owner.into(),
        }
    }
}
