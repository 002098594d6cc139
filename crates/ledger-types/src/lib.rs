//! Currency records, coins and the balance-ledger collaborator boundary.
//!
//! The generic balance arithmetic itself lives outside this system; the
//! handlers only rely on the [`BalanceLedger`] contract defined here.

mod coin;
mod currency;
mod errors;
mod ledger;

#[cfg(feature = "stubs")]
pub mod stub;

pub use coin::{Coin, LedgerAmount};
pub use currency::{Currency, CurrencyRegistry};
pub use errors::LedgerError;
pub use ledger::BalanceLedger;
