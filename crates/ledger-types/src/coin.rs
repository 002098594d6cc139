//! Coin values in the local ledger's denomination.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// An amount in a currency's smallest local unit.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct LedgerAmount(u128);

impl LedgerAmount {
    pub const ZERO: LedgerAmount = LedgerAmount(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn to_u128(self) -> u128 {
        self.0
    }

    pub fn checked_add(self, rhs: LedgerAmount) -> Option<LedgerAmount> {
        self.0.checked_add(rhs.0).map(LedgerAmount)
    }

    pub fn checked_sub(self, rhs: LedgerAmount) -> Option<LedgerAmount> {
        self.0.checked_sub(rhs.0).map(LedgerAmount)
    }
}

impl ::core::fmt::Display for LedgerAmount {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A currency-tagged ledger amount, the unit the balance ledger trades in.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Coin {
    currency: String,
    amount: LedgerAmount,
}

impl Coin {
    pub fn new(currency: impl Into<String>, amount: LedgerAmount) -> Self {
        Self {
            currency: currency.into(),
            amount,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> LedgerAmount {
        self.amount
    }

    /// Adds two coins of the same currency.
    pub fn checked_add(&self, rhs: &Coin) -> Result<Coin, LedgerError> {
        if self.currency != rhs.currency {
            return Err(LedgerError::CurrencyMismatch {
                left: self.currency.clone(),
                right: rhs.currency.clone(),
            });
        }
        let amount = self
            .amount
            .checked_add(rhs.amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(Coin::new(self.currency.clone(), amount))
    }
}

impl ::core::fmt::Display for Coin {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_add_same_currency() {
        let a = Coin::new("pBTC", LedgerAmount::new(10));
        let b = Coin::new("pBTC", LedgerAmount::new(32));
        assert_eq!(a.checked_add(&b).unwrap().amount(), LedgerAmount::new(42));
    }

    #[test]
    fn test_coin_add_currency_mismatch() {
        let a = Coin::new("pBTC", LedgerAmount::new(10));
        let b = Coin::new("pETH", LedgerAmount::new(32));
        assert!(matches!(
            a.checked_add(&b),
            Err(LedgerError::CurrencyMismatch { .. })
        ));
    }
}
