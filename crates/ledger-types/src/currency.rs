//! Currency records and the registry the handlers resolve them from.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use pegbridge_primitives::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    coin::{Coin, LedgerAmount},
    errors::LedgerError,
};

/// Decimal places of the external chain's base unit (satoshis).
const EXTERNAL_UNIT_DECIMALS: u8 = 8;

/// A pegged currency registered on the local ledger.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Currency {
    name: String,

    /// Decimal places of the currency's smallest local unit. Must be at least
    /// the external chain's 8, so external amounts convert without loss.
    decimals: u8,
}

impl Currency {
    pub fn new(name: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            decimals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Converts an external-chain amount into this currency's local coin.
    pub fn coin_from_sat(&self, amount: SatAmount) -> Result<Coin, LedgerError> {
        let shift = self
            .decimals
            .checked_sub(EXTERNAL_UNIT_DECIMALS)
            .ok_or_else(|| LedgerError::UnconvertibleCurrency(self.name.clone()))?;
        let scale = 10u128
            .checked_pow(shift as u32)
            .ok_or(LedgerError::Overflow)?;
        let value = (amount.to_sat() as u128)
            .checked_mul(scale)
            .ok_or(LedgerError::Overflow)?;
        Ok(Coin::new(self.name.clone(), LedgerAmount::new(value)))
    }
}

/// Process-wide currency registry, built once at startup and shared by
/// reference into the handler set.
#[derive(Clone, Debug, Default)]
pub struct CurrencyRegistry {
    currencies: BTreeMap<String, Currency>,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a currency, replacing any previous record with the same name.
    pub fn register(&mut self, currency: Currency) {
        self.currencies.insert(currency.name().to_owned(), currency);
    }

    pub fn by_name(&self, name: &str) -> Option<&Currency> {
        self.currencies.get(name)
    }
}
