//! Login session state
//!
//! A `Session` is an explicit value scoped to one login/logout cycle and
//! passed to every command handler; there is no process-wide "current user".
//! It carries the identity and capabilities of the logged-in account plus
//! the running total of credit added this session, which the addcredit cap
//! is checked against. Balances are never cached here - the store files stay
//! authoritative.

use crate::types::{MarketError, UserType};
use rust_decimal::Decimal;

/// Maximum credit that may be added to an account in one session
pub const SESSION_CREDIT_LIMIT: Decimal = Decimal::from_parts(100000, 0, 0, false, 2);

/// The logged-in user for one login/logout cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Username of the logged-in account
    pub username: String,

    /// Account type at login time
    pub user_type: UserType,

    /// Credit added via addcredit so far this session
    pub credit_added: Decimal,
}

impl Session {
    /// Start a session for an account
    pub fn new(username: impl Into<String>, user_type: UserType) -> Self {
        Session {
            username: username.into(),
            user_type,
            credit_added: Decimal::ZERO,
        }
    }

    /// Record an addcredit amount against the session cap
    ///
    /// Fails without changing the tally when the cap would be exceeded.
    pub fn add_credit(&mut self, amount: Decimal) -> Result<(), MarketError> {
        if self.credit_added + amount > SESSION_CREDIT_LIMIT {
            return Err(MarketError::SessionCreditLimit {
                requested: amount,
                added: self.credit_added,
                limit: SESSION_CREDIT_LIMIT,
            });
        }
        self.credit_added += amount;
        Ok(())
    }
}
