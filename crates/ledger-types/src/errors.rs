use pegbridge_primitives::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// The named currency is not registered.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// The currency cannot represent external-chain amounts.
    #[error("currency {0} cannot represent external amounts")]
    UnconvertibleCurrency(String),

    /// Arithmetic on two coins of different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// The account balance cannot cover the requested debit.
    #[error("insufficient funds for {address}: have {available}, need {needed}")]
    InsufficientFunds {
        address: AccountAddress,
        available: u128,
        needed: u128,
    },

    /// Balance arithmetic overflowed.
    #[error("balance arithmetic overflow")]
    Overflow,
}
