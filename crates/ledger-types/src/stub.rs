//! In-memory balance ledger stub for tests and local tooling.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use pegbridge_primitives::prelude::*;

use crate::{coin::Coin, errors::LedgerError, ledger::BalanceLedger};

type Balances = BTreeMap<AccountAddress, BTreeMap<String, u128>>;

/// Map-backed [`BalanceLedger`] with the same failure semantics as the real
/// ledger (insufficient-funds debits are refused, never truncated).
#[derive(Debug, Default)]
pub struct StubBalanceLedger {
    balances: RwLock<Balances>,
}

impl StubBalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceLedger for StubBalanceLedger {
    fn add_to_address(&self, address: &AccountAddress, coin: &Coin) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let entry = balances
            .entry(*address)
            .or_default()
            .entry(coin.currency().to_owned())
            .or_default();
        *entry = entry
            .checked_add(coin.amount().to_u128())
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn sub_from_address(&self, address: &AccountAddress, coin: &Coin) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let entry = balances
            .entry(*address)
            .or_default()
            .entry(coin.currency().to_owned())
            .or_default();
        let needed = coin.amount().to_u128();
        if *entry < needed {
            return Err(LedgerError::InsufficientFunds {
                address: *address,
                available: *entry,
                needed,
            });
        }
        *entry -= needed;
        Ok(())
    }

    fn balance_of(&self, address: &AccountAddress, currency: &str) -> u128 {
        self.balances
            .read()
            .get(address)
            .and_then(|per_currency| per_currency.get(currency))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::coin::LedgerAmount;

    use super::*;

    #[test]
    fn test_credit_debit_cycle() {
        let ledger = StubBalanceLedger::new();
        let address = AccountAddress::new([1u8; 20]);
        let coin = Coin::new("pBTC", LedgerAmount::new(100));

        ledger.add_to_address(&address, &coin).unwrap();
        assert_eq!(ledger.balance_of(&address, "pBTC"), 100);

        ledger
            .sub_from_address(&address, &Coin::new("pBTC", LedgerAmount::new(40)))
            .unwrap();
        assert_eq!(ledger.balance_of(&address, "pBTC"), 60);

        let err = ledger
            .sub_from_address(&address, &Coin::new("pBTC", LedgerAmount::new(61)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance_of(&address, "pBTC"), 60);
    }
}
