//! The balance-ledger collaborator contract.

use pegbridge_primitives::prelude::*;

use crate::{coin::Coin, errors::LedgerError};

/// Interface to the generic balance ledger.
///
/// Implementations are shared across all trackers; the transaction pipeline
/// is the sole writer (see the concurrency notes in `pegbridge-handlers`).
pub trait BalanceLedger: Send + Sync + 'static {
    /// Credits a coin to an address.
    fn add_to_address(&self, address: &AccountAddress, coin: &Coin) -> Result<(), LedgerError>;

    /// Debits a coin from an address. Fails with
    /// [`LedgerError::InsufficientFunds`] if the balance cannot cover it.
    fn sub_from_address(&self, address: &AccountAddress, coin: &Coin) -> Result<(), LedgerError>;

    /// Returns the address's balance in the given currency.
    fn balance_of(&self, address: &AccountAddress, currency: &str) -> u128;
}
