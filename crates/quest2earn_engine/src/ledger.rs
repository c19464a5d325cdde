//! # Token Ledger
//!
//! Fungible game token balances. Total supply is tracked alongside the
//! balances and always equals their sum.

use std::collections::BTreeMap;

use quest2earn_shared::{Principal, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Per-account token balances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: BTreeMap<Principal, TokenAmount>,
    total_supply: TokenAmount,
}

impl TokenLedger {
    /// Creates a ledger holding the given opening balances.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ArithmeticOverflow` if the balances sum past
    /// `u64::MAX`.
    pub fn from_genesis(balances: &BTreeMap<Principal, TokenAmount>) -> GameResult<Self> {
        let mut ledger = Self::default();
        for (account, &amount) in balances {
            if amount > 0 {
                ledger.mint(account, amount)?;
            }
        }
        Ok(ledger)
    }

    /// Balance of an account, zero if unknown.
    #[must_use]
    pub fn balance_of(&self, account: &Principal) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all balances.
    #[inline]
    #[must_use]
    pub const fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Accounts with a non-zero balance, in key order.
    pub fn holders(&self) -> impl Iterator<Item = (&Principal, TokenAmount)> {
        self.balances.iter().map(|(k, &v)| (k, v))
    }

    /// Creates tokens in `to`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ArithmeticOverflow` if supply would overflow;
    /// the ledger is unchanged.
    pub fn mint(&mut self, to: &Principal, amount: TokenAmount) -> GameResult<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(GameError::ArithmeticOverflow)?;
        if amount == 0 {
            return Ok(());
        }
        // balance <= supply, so it cannot overflow either
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        self.total_supply = supply;
        Ok(())
    }

    /// Destroys tokens held by `from`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InsufficientBalance` if `from` holds less than
    /// `amount`.
    pub fn burn(&mut self, from: &Principal, amount: TokenAmount) -> GameResult<()> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    /// Moves tokens between accounts.
    ///
    /// # Errors
    ///
    /// - `GameError::InvalidAmount` for a zero amount
    /// - `GameError::SelfTransfer` when `from == to`
    /// - `GameError::InsufficientBalance` when `from` holds too little
    pub fn transfer(
        &mut self,
        from: &Principal,
        to: &Principal,
        amount: TokenAmount,
    ) -> GameResult<()> {
        if amount == 0 {
            return Err(GameError::InvalidAmount);
        }
        if from == to {
            return Err(GameError::SelfTransfer);
        }
        self.debit(from, amount)?;
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    fn debit(&mut self, from: &Principal, amount: TokenAmount) -> GameResult<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(GameError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.clone(), remaining);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Principal {
        Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap()
    }

    fn bob() -> Principal {
        Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG").unwrap()
    }

    fn sum(ledger: &TokenLedger) -> u64 {
        ledger.holders().map(|(_, v)| v).sum()
    }

    #[test]
    fn test_unknown_account_is_zero() {
        assert_eq!(TokenLedger::default().balance_of(&alice()), 0);
    }

    #[test]
    fn test_transfer() {
        let mut ledger = TokenLedger::default();
        ledger.mint(&alice(), 100).unwrap();
        ledger.transfer(&alice(), &bob(), 40).unwrap();

        assert_eq!(ledger.balance_of(&alice()), 60);
        assert_eq!(ledger.balance_of(&bob()), 40);
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(sum(&ledger), 100);
    }

    #[test]
    fn test_transfer_errors_leave_ledger_unchanged() {
        let mut ledger = TokenLedger::default();
        ledger.mint(&alice(), 100).unwrap();
        let before = ledger.clone();

        assert_eq!(ledger.transfer(&alice(), &bob(), 0), Err(GameError::InvalidAmount));
        assert_eq!(ledger.transfer(&alice(), &alice(), 10), Err(GameError::SelfTransfer));
        assert_eq!(
            ledger.transfer(&alice(), &bob(), 150),
            Err(GameError::InsufficientBalance {
                required: 150,
                available: 100
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_burn() {
        let mut ledger = TokenLedger::default();
        ledger.mint(&alice(), 30).unwrap();
        ledger.burn(&alice(), 10).unwrap();
        assert_eq!(ledger.balance_of(&alice()), 20);
        assert_eq!(ledger.total_supply(), 20);
        assert!(ledger.burn(&alice(), 21).is_err());
        assert_eq!(ledger.total_supply(), 20);
    }

    #[test]
    fn test_mint_overflow() {
        let mut ledger = TokenLedger::default();
        ledger.mint(&alice(), u64::MAX).unwrap();
        assert_eq!(ledger.mint(&bob(), 1), Err(GameError::ArithmeticOverflow));
        assert_eq!(ledger.balance_of(&bob()), 0);
    }

    #[test]
    fn test_genesis() {
        let mut balances = BTreeMap::new();
        balances.insert(alice(), 500);
        balances.insert(bob(), 0);
        let ledger = TokenLedger::from_genesis(&balances).unwrap();
        assert_eq!(ledger.total_supply(), 500);
        assert_eq!(ledger.holders().count(), 1);
    }
}
