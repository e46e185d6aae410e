//! Marketplace engine
//!
//! Orchestrates the marketplace commands over the three record stores and
//! the daily transaction log. All business rules live here: the stores
//! enforce only the structural width/format invariant, never semantics.
//!
//! The engine re-derives state from disk for every command; no balances or
//! listings are cached between calls. Mutations that touch two stores (a
//! purchase updates two accounts and appends an ownership record) are a
//! sequence of independent rewrites; a crash between them can leave the
//! files mutually inconsistent, which is an accepted limitation of the
//! format.

use crate::core::record_store::RecordStore;
use crate::core::session::Session;
use crate::core::tx_log::{EventCode, TransactionLog};
use crate::io::FixedWidthRecord;
use crate::types::{InventoryRecord, MarketError, OwnershipRecord, UserRecord, UserType};
use rust_decimal::Decimal;
use std::path::Path;

/// Maximum username length in characters
pub const MAX_USERNAME_LEN: usize = 15;

/// Maximum game name length in characters
pub const MAX_GAME_NAME_LEN: usize = 25;

/// Maximum credit balance an account may hold
pub const MAX_CREDIT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Minimum price of a listing
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum price of a listing
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

/// The marketplace command engine
///
/// Owns the three record stores and the transaction log for one program
/// run. Commands requiring a logged-in user take a [`Session`].
pub struct Marketplace {
    users: RecordStore<UserRecord>,
    inventory: RecordStore<InventoryRecord>,
    ownership: RecordStore<OwnershipRecord>,
    log: TransactionLog,
}

impl Marketplace {
    /// Open the marketplace over its four backing files
    ///
    /// Files need not exist yet; stores create them on first mutation.
    pub fn open(
        accounts: impl AsRef<Path>,
        inventory: impl AsRef<Path>,
        ownership: impl AsRef<Path>,
        log: impl AsRef<Path>,
    ) -> Self {
        Marketplace {
            users: RecordStore::open(accounts.as_ref()),
            inventory: RecordStore::open(inventory.as_ref()),
            ownership: RecordStore::open(ownership.as_ref()),
            log: TransactionLog::new(log.as_ref().to_path_buf()),
        }
    }

    /// Log a user in, starting a session
    pub fn login(&self, username: &str) -> Result<Session, MarketError> {
        let user = self.require_user(username)?;
        Ok(Session::new(user.username, user.user_type))
    }

    /// End a session: write the end-of-session snapshot and flush the log
    ///
    /// The snapshot reflects the account's balance at logout time. A user
    /// deleted mid-session (only possible by deleting one's own account,
    /// which is refused) would simply skip the snapshot.
    pub fn logout(&mut self, session: Session) -> Result<(), MarketError> {
        if let Some(user) = self.users.find(&session.username)? {
            self.log.push_user_event(EventCode::EndOfSession, &user);
        }
        self.flush_log()
    }

    /// Create a new account (admin only)
    pub fn create_user(
        &mut self,
        session: &Session,
        username: &str,
        user_type: UserType,
        credit: Decimal,
    ) -> Result<UserRecord, MarketError> {
        self.require_admin(session, "create users")?;
        validate_username(username)?;
        if !(Decimal::ZERO..=MAX_CREDIT).contains(&credit) {
            return Err(MarketError::amount_out_of_range(
                "credit",
                credit,
                Decimal::ZERO,
                MAX_CREDIT,
            ));
        }
        if self.users.exists(&username.to_string())? {
            return Err(MarketError::duplicate_user(username));
        }

        let user = UserRecord::new(username, user_type, credit);
        self.users.append(&user)?;
        self.log.push_user_event(EventCode::CreateUser, &user);
        Ok(user)
    }

    /// Delete an account and all its listings and owned games (admin only)
    ///
    /// Deleting the logged-in account is refused so the session never
    /// outlives its user.
    pub fn delete_user(&mut self, session: &Session, username: &str) -> Result<(), MarketError> {
        self.require_admin(session, "delete users")?;
        if username == session.username {
            return Err(MarketError::not_permitted(
                &session.username,
                "delete the active account",
            ));
        }

        let user = self.require_user(username)?;
        self.users.delete_by_key(&username.to_string())?;
        self.inventory.delete_where(|r| r.seller == username)?;
        self.ownership.delete_where(|r| r.owner == username)?;

        self.log.push_user_event(EventCode::DeleteUser, &user);
        Ok(())
    }

    /// List a game for sale
    pub fn sell(
        &mut self,
        session: &Session,
        game_name: &str,
        price: Decimal,
    ) -> Result<InventoryRecord, MarketError> {
        if !session.user_type.can_sell() {
            return Err(MarketError::not_permitted(&session.username, "sell games"));
        }
        validate_game_name(game_name)?;
        if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
            return Err(MarketError::amount_out_of_range(
                "price", price, MIN_PRICE, MAX_PRICE,
            ));
        }

        let listing = InventoryRecord::new(game_name, session.username.clone(), price);
        if self.inventory.exists(&listing.key())? {
            return Err(MarketError::DuplicateListing {
                game: game_name.to_string(),
                seller: session.username.clone(),
            });
        }

        self.inventory.append(&listing)?;
        self.log.push_sell(&listing);
        Ok(listing)
    }

    /// Buy a listed game from a seller
    ///
    /// Transfers the price from buyer to seller and appends an ownership
    /// record. The two account updates and the ownership append are separate
    /// rewrites, in that order.
    pub fn buy(
        &mut self,
        session: &Session,
        game_name: &str,
        seller: &str,
    ) -> Result<InventoryRecord, MarketError> {
        if !session.user_type.can_buy() {
            return Err(MarketError::not_permitted(&session.username, "buy games"));
        }
        if seller == session.username {
            return Err(MarketError::OwnListing {
                username: session.username.clone(),
                game: game_name.to_string(),
            });
        }

        let key = (game_name.to_string(), seller.to_string());
        let listing = self
            .inventory
            .find(&key)?
            .ok_or_else(|| MarketError::UnknownListing {
                game: game_name.to_string(),
                seller: seller.to_string(),
            })?;

        let ownership_key = (game_name.to_string(), session.username.clone());
        if self.ownership.exists(&ownership_key)? {
            return Err(MarketError::AlreadyOwned {
                username: session.username.clone(),
                game: game_name.to_string(),
            });
        }

        let buyer = self.require_user(&session.username)?;
        if buyer.credit < listing.price {
            return Err(MarketError::insufficient_credit(
                &buyer.username,
                buyer.credit,
                listing.price,
            ));
        }
        let seller_record = self.require_user(seller)?;
        if seller_record.credit + listing.price > MAX_CREDIT {
            return Err(MarketError::amount_out_of_range(
                "credit",
                seller_record.credit + listing.price,
                Decimal::ZERO,
                MAX_CREDIT,
            ));
        }

        self.adjust_credit(&buyer, -listing.price)?;
        self.adjust_credit(&seller_record, listing.price)?;
        self.ownership
            .append(&OwnershipRecord::new(game_name, session.username.clone()))?;

        self.log.push_buy(&listing, &session.username);
        self.log.push_credit_movement(
            EventCode::CreditTransfer,
            seller,
            &session.username,
            listing.price,
        );
        Ok(listing)
    }

    /// Move credit from a seller back to a buyer (admin only)
    pub fn refund(
        &mut self,
        session: &Session,
        buyer: &str,
        seller: &str,
        amount: Decimal,
    ) -> Result<(), MarketError> {
        self.require_admin(session, "issue refunds")?;
        if !(MIN_PRICE..=MAX_CREDIT).contains(&amount) {
            return Err(MarketError::amount_out_of_range(
                "refund", amount, MIN_PRICE, MAX_CREDIT,
            ));
        }

        let buyer_record = self.require_user(buyer)?;
        let seller_record = self.require_user(seller)?;
        if seller_record.credit < amount {
            return Err(MarketError::insufficient_credit(
                seller,
                seller_record.credit,
                amount,
            ));
        }
        if buyer_record.credit + amount > MAX_CREDIT {
            return Err(MarketError::amount_out_of_range(
                "credit",
                buyer_record.credit + amount,
                Decimal::ZERO,
                MAX_CREDIT,
            ));
        }

        self.adjust_credit(&seller_record, -amount)?;
        self.adjust_credit(&buyer_record, amount)?;
        self.log
            .push_credit_movement(EventCode::Refund, buyer, seller, amount);
        Ok(())
    }

    /// Add credit to the logged-in account
    ///
    /// Capped per session; the cap tally lives in the session, the balance
    /// in the store.
    pub fn add_credit(
        &mut self,
        session: &mut Session,
        amount: Decimal,
    ) -> Result<Decimal, MarketError> {
        if amount <= Decimal::ZERO {
            return Err(MarketError::amount_out_of_range(
                "credit",
                amount,
                MIN_PRICE,
                MAX_CREDIT,
            ));
        }

        let user = self.require_user(&session.username)?;
        if user.credit + amount > MAX_CREDIT {
            return Err(MarketError::amount_out_of_range(
                "credit",
                user.credit + amount,
                Decimal::ZERO,
                MAX_CREDIT,
            ));
        }

        session.add_credit(amount)?;
        let updated = self.adjust_credit(&user, amount)?;
        self.log.push_user_event(EventCode::AddCredit, &updated);
        Ok(updated.credit)
    }

    /// All accounts, in file order (admin only)
    pub fn list_users(&self, session: &Session) -> Result<Vec<UserRecord>, MarketError> {
        self.require_admin(session, "list accounts")?;
        self.users.load_all()
    }

    /// All listings, in file order
    pub fn list_inventory(&self) -> Result<Vec<InventoryRecord>, MarketError> {
        self.inventory.load_all()
    }

    /// Games owned by a user, in file order
    pub fn list_collection(&self, username: &str) -> Result<Vec<OwnershipRecord>, MarketError> {
        Ok(self
            .ownership
            .load_all()?
            .into_iter()
            .filter(|r| r.owner == username)
            .collect())
    }

    /// Flush any buffered transaction-log events
    pub fn flush_log(&mut self) -> Result<(), MarketError> {
        let path = self.log.path().to_path_buf();
        self.log.flush().map_err(|e| MarketError::io(&path, &e))
    }

    fn require_user(&self, username: &str) -> Result<UserRecord, MarketError> {
        self.users
            .find(&username.to_string())?
            .ok_or_else(|| MarketError::unknown_user(username))
    }

    fn require_admin(&self, session: &Session, operation: &str) -> Result<(), MarketError> {
        if session.user_type.is_admin() {
            Ok(())
        } else {
            Err(MarketError::not_permitted(&session.username, operation))
        }
    }

    /// Rewrite one account with its balance adjusted by `delta`
    fn adjust_credit(&self, user: &UserRecord, delta: Decimal) -> Result<UserRecord, MarketError> {
        let updated = UserRecord::new(user.username.clone(), user.user_type, user.credit + delta);
        self.users.update_by_key(&updated.username, updated.clone())?;
        Ok(updated)
    }
}

/// Validate a username per the account constraints
///
/// 1..=15 ASCII characters, free of the pad character `_` and of spaces
/// (usernames are command-line tokens).
fn validate_username(username: &str) -> Result<(), MarketError> {
    validate_name("username", username, MAX_USERNAME_LEN)?;
    if username.contains(' ') {
        return Err(MarketError::invalid_name(
            "username",
            username,
            "must not contain spaces",
        ));
    }
    Ok(())
}

/// Validate a game name per the inventory constraints
///
/// Spaces are allowed (titles are multi-word); the `_` pad character is not.
fn validate_game_name(game_name: &str) -> Result<(), MarketError> {
    validate_name("game name", game_name, MAX_GAME_NAME_LEN)
}

fn validate_name(what: &'static str, value: &str, max_len: usize) -> Result<(), MarketError> {
    if value.is_empty() {
        return Err(MarketError::invalid_name(what, value, "must not be empty"));
    }
    if value.len() > max_len {
        return Err(MarketError::invalid_name(
            what,
            value,
            &format!("longer than {max_len} characters"),
        ));
    }
    if !value.is_ascii() {
        return Err(MarketError::invalid_name(what, value, "must be ASCII"));
    }
    if value.contains('_') {
        return Err(MarketError::invalid_name(
            what,
            value,
            "must not contain the pad character '_'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        market: Marketplace,
    }

    /// A marketplace seeded with an admin and two standard users.
    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let mut market = Marketplace::open(
            dir.path().join("accounts.txt"),
            dir.path().join("inventory.txt"),
            dir.path().join("ownership.txt"),
            dir.path().join("daily.txt"),
        );

        let admin = Session::new("root", UserType::Admin);
        market
            .create_user(&admin, "rootadmin", UserType::Admin, Decimal::ZERO)
            .unwrap();
        Fixture { _dir: dir, market }
    }

    fn admin_session() -> Session {
        Session::new("rootadmin", UserType::Admin)
    }

    fn seed_user(market: &mut Marketplace, name: &str, user_type: UserType, credit: i64) {
        market
            .create_user(&admin_session(), name, user_type, Decimal::new(credit, 2))
            .unwrap();
    }

    #[test]
    fn test_login_unknown_user() {
        let f = fixture();
        assert_eq!(
            f.market.login("ghost").unwrap_err(),
            MarketError::unknown_user("ghost")
        );
    }

    #[test]
    fn test_create_requires_admin() {
        let mut f = fixture();
        seed_user(&mut f.market, "bob", UserType::FullStandard, 0);

        let bob = f.market.login("bob").unwrap();
        let result = f
            .market
            .create_user(&bob, "eve", UserType::BuyStandard, Decimal::ZERO);
        assert_eq!(
            result.unwrap_err(),
            MarketError::not_permitted("bob", "create users")
        );
    }

    #[test]
    fn test_create_rejects_duplicates_and_bad_names() {
        let mut f = fixture();
        seed_user(&mut f.market, "bob", UserType::FullStandard, 0);
        let admin = admin_session();

        assert_eq!(
            f.market
                .create_user(&admin, "bob", UserType::BuyStandard, Decimal::ZERO)
                .unwrap_err(),
            MarketError::duplicate_user("bob")
        );
        assert!(matches!(
            f.market
                .create_user(&admin, "waytoolongusername123", UserType::BuyStandard, Decimal::ZERO)
                .unwrap_err(),
            MarketError::InvalidName { .. }
        ));
        assert!(matches!(
            f.market
                .create_user(&admin, "bad_name", UserType::BuyStandard, Decimal::ZERO)
                .unwrap_err(),
            MarketError::InvalidName { .. }
        ));
        assert!(matches!(
            f.market
                .create_user(&admin, "", UserType::BuyStandard, Decimal::ZERO)
                .unwrap_err(),
            MarketError::InvalidName { .. }
        ));
    }

    #[test]
    fn test_buy_transfers_credit_and_ownership() {
        let mut f = fixture();
        seed_user(&mut f.market, "seller", UserType::SellStandard, 0);
        seed_user(&mut f.market, "buyer", UserType::BuyStandard, 10000);

        let seller = f.market.login("seller").unwrap();
        f.market
            .sell(&seller, "Chess", Decimal::new(2550, 2))
            .unwrap();

        let buyer = f.market.login("buyer").unwrap();
        f.market.buy(&buyer, "Chess", "seller").unwrap();

        let accounts = f.market.list_users(&admin_session()).unwrap();
        let credit_of = |name: &str| {
            accounts
                .iter()
                .find(|u| u.username == name)
                .unwrap()
                .credit
        };
        assert_eq!(credit_of("buyer"), Decimal::new(7450, 2));
        assert_eq!(credit_of("seller"), Decimal::new(2550, 2));

        let collection = f.market.list_collection("buyer").unwrap();
        assert_eq!(collection, vec![OwnershipRecord::new("Chess", "buyer")]);
    }

    #[test]
    fn test_buy_rejections() {
        let mut f = fixture();
        seed_user(&mut f.market, "seller", UserType::FullStandard, 0);
        seed_user(&mut f.market, "poor", UserType::BuyStandard, 100);
        seed_user(&mut f.market, "sellonly", UserType::SellStandard, 10000);

        let seller = f.market.login("seller").unwrap();
        f.market
            .sell(&seller, "Chess", Decimal::new(2550, 2))
            .unwrap();

        // Sell-only accounts may not buy.
        let sellonly = f.market.login("sellonly").unwrap();
        assert!(matches!(
            f.market.buy(&sellonly, "Chess", "seller").unwrap_err(),
            MarketError::NotPermitted { .. }
        ));

        // Sellers may not buy their own listing.
        assert_eq!(
            f.market.buy(&seller, "Chess", "seller").unwrap_err(),
            MarketError::OwnListing {
                username: "seller".to_string(),
                game: "Chess".to_string()
            }
        );

        // Unknown listing.
        let poor = f.market.login("poor").unwrap();
        assert!(matches!(
            f.market.buy(&poor, "Go", "seller").unwrap_err(),
            MarketError::UnknownListing { .. }
        ));

        // Insufficient credit leaves everything unchanged.
        assert!(matches!(
            f.market.buy(&poor, "Chess", "seller").unwrap_err(),
            MarketError::InsufficientCredit { .. }
        ));
        assert!(f.market.list_collection("poor").unwrap().is_empty());
    }

    #[test]
    fn test_buy_twice_rejected_as_already_owned() {
        let mut f = fixture();
        seed_user(&mut f.market, "seller", UserType::SellStandard, 0);
        seed_user(&mut f.market, "buyer", UserType::FullStandard, 20000);

        let seller = f.market.login("seller").unwrap();
        f.market.sell(&seller, "Chess", Decimal::new(100, 2)).unwrap();

        let buyer = f.market.login("buyer").unwrap();
        f.market.buy(&buyer, "Chess", "seller").unwrap();
        assert!(matches!(
            f.market.buy(&buyer, "Chess", "seller").unwrap_err(),
            MarketError::AlreadyOwned { .. }
        ));
    }

    #[test]
    fn test_sell_rejections() {
        let mut f = fixture();
        seed_user(&mut f.market, "buyonly", UserType::BuyStandard, 0);
        seed_user(&mut f.market, "seller", UserType::SellStandard, 0);

        let buyonly = f.market.login("buyonly").unwrap();
        assert!(matches!(
            f.market
                .sell(&buyonly, "Chess", Decimal::new(100, 2))
                .unwrap_err(),
            MarketError::NotPermitted { .. }
        ));

        let seller = f.market.login("seller").unwrap();
        assert!(matches!(
            f.market.sell(&seller, "Chess", Decimal::ZERO).unwrap_err(),
            MarketError::AmountOutOfRange { .. }
        ));
        assert!(matches!(
            f.market
                .sell(&seller, "Chess", Decimal::new(100000, 2))
                .unwrap_err(),
            MarketError::AmountOutOfRange { .. }
        ));

        f.market.sell(&seller, "Chess", Decimal::new(100, 2)).unwrap();
        assert!(matches!(
            f.market
                .sell(&seller, "Chess", Decimal::new(200, 2))
                .unwrap_err(),
            MarketError::DuplicateListing { .. }
        ));
    }

    #[test]
    fn test_delete_user_cascades() {
        let mut f = fixture();
        seed_user(&mut f.market, "seller", UserType::FullStandard, 10000);
        seed_user(&mut f.market, "buyer", UserType::FullStandard, 10000);

        let seller = f.market.login("seller").unwrap();
        f.market.sell(&seller, "Chess", Decimal::new(100, 2)).unwrap();
        f.market.sell(&seller, "Go", Decimal::new(100, 2)).unwrap();

        let buyer = f.market.login("buyer").unwrap();
        f.market.buy(&buyer, "Chess", "seller").unwrap();

        f.market.delete_user(&admin_session(), "buyer").unwrap();

        // The buyer's account and collection are gone; the seller's
        // listings are untouched.
        assert!(matches!(
            f.market.login("buyer").unwrap_err(),
            MarketError::UnknownUser { .. }
        ));
        assert!(f.market.list_collection("buyer").unwrap().is_empty());
        assert_eq!(f.market.list_inventory().unwrap().len(), 2);

        f.market.delete_user(&admin_session(), "seller").unwrap();
        assert!(f.market.list_inventory().unwrap().is_empty());
    }

    #[test]
    fn test_delete_active_account_refused() {
        let mut f = fixture();
        let admin = admin_session();
        assert!(matches!(
            f.market.delete_user(&admin, "rootadmin").unwrap_err(),
            MarketError::NotPermitted { .. }
        ));
    }

    #[test]
    fn test_refund_moves_credit() {
        let mut f = fixture();
        seed_user(&mut f.market, "seller", UserType::SellStandard, 5000);
        seed_user(&mut f.market, "buyer", UserType::BuyStandard, 0);

        f.market
            .refund(&admin_session(), "buyer", "seller", Decimal::new(2000, 2))
            .unwrap();

        let accounts = f.market.list_users(&admin_session()).unwrap();
        let credit_of = |name: &str| {
            accounts
                .iter()
                .find(|u| u.username == name)
                .unwrap()
                .credit
        };
        assert_eq!(credit_of("seller"), Decimal::new(3000, 2));
        assert_eq!(credit_of("buyer"), Decimal::new(2000, 2));
    }

    #[test]
    fn test_refund_requires_seller_funds() {
        let mut f = fixture();
        seed_user(&mut f.market, "seller", UserType::SellStandard, 500);
        seed_user(&mut f.market, "buyer", UserType::BuyStandard, 0);

        assert!(matches!(
            f.market
                .refund(&admin_session(), "buyer", "seller", Decimal::new(2000, 2))
                .unwrap_err(),
            MarketError::InsufficientCredit { .. }
        ));
    }

    #[test]
    fn test_add_credit_updates_balance_and_respects_session_cap() {
        let mut f = fixture();
        seed_user(&mut f.market, "bob", UserType::FullStandard, 1000);

        let mut bob = f.market.login("bob").unwrap();
        let balance = f
            .market
            .add_credit(&mut bob, Decimal::new(50000, 2))
            .unwrap();
        assert_eq!(balance, Decimal::new(51000, 2));

        // 500 already added; another 600 crosses the 1000 session cap.
        assert!(matches!(
            f.market
                .add_credit(&mut bob, Decimal::new(60000, 2))
                .unwrap_err(),
            MarketError::SessionCreditLimit { .. }
        ));

        // A fresh session gets a fresh cap.
        let mut bob2 = f.market.login("bob").unwrap();
        f.market
            .add_credit(&mut bob2, Decimal::new(60000, 2))
            .unwrap();
    }

    #[test]
    fn test_credit_ceiling_enforced() {
        let mut f = fixture();
        seed_user(&mut f.market, "rich", UserType::FullStandard, 99_999_950);

        let mut rich = f.market.login("rich").unwrap();
        assert!(matches!(
            f.market
                .add_credit(&mut rich, Decimal::new(100, 2))
                .unwrap_err(),
            MarketError::AmountOutOfRange { .. }
        ));
    }

    #[test]
    fn test_logout_writes_end_of_session_event() {
        let mut f = fixture();
        seed_user(&mut f.market, "bob", UserType::FullStandard, 1000);

        let bob = f.market.login("bob").unwrap();
        f.market.logout(bob).unwrap();

        let log = std::fs::read_to_string(f.market.log.path()).unwrap();
        assert!(log.contains("00 bob_____________ FS 000010.00"));
        // Seed events from the fixture are flushed too.
        assert!(log.contains("01 bob_____________ FS 000010.00"));
    }
}

