use pegbridge_primitives::prelude::*;
use thiserror::Error;

/// Pair of an expected and an actually-observed value, for mismatch errors.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Mismatch<T> {
    pub expected: T,
    pub got: T,
}

impl<T: ::core::fmt::Display> ::core::fmt::Display for Mismatch<T> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.got)
    }
}

#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    /// A new lock/redeem was attempted while a process is already in flight.
    #[error("tracker not available for a new process")]
    NotAvailable,

    /// The embedded external transaction has no inputs.
    #[error("external transaction has no inputs")]
    MissingInputs,

    /// The embedded external transaction has no outputs.
    #[error("external transaction has no outputs")]
    MissingOutputs,

    /// The external transaction does not spend the tracker's current custody
    /// output.
    #[error("external transaction does not extend the custody chain: {0}")]
    SpentOutputMismatch(Mismatch<OutputRef>),

    /// A non-initial transaction was submitted against a tracker that has no
    /// committed custody output yet.
    #[error("no custody output recorded for a chained transaction")]
    NoCustodyOutput,

    /// A first lock transaction's sole output value must equal the lock
    /// amount plus the tracker's committed balance.
    #[error("first lock output value mismatch: {0}")]
    FirstLockValueMismatch(Mismatch<u64>),

    /// The redeem amount exceeds the committed custody balance.
    #[error("redeem amount {amount} exceeds custody balance {balance}")]
    BalanceUnderflow { balance: SatAmount, amount: SatAmount },

    /// Adding the lock amount to the committed balance overflowed.
    #[error("custody balance overflow")]
    BalanceOverflow,

    /// A participant snapshot cannot be captured from an empty validator set.
    #[error("validator set is empty")]
    EmptyValidatorSet,

    /// A state transition was requested outside of an in-flight process.
    #[error("tracker has no in-flight process")]
    NoProcess,

    /// A state transition was requested from the wrong state.
    #[error("invalid tracker state for transition: {0:?}")]
    InvalidState(crate::tracker::TrackerState),
}

#[derive(Debug, Clone, Error)]
pub enum VoteError {
    /// The vote index is outside the captured participant list.
    #[error("vote index {idx} out of range for {len} participants")]
    IndexOutOfRange { idx: i64, len: u32 },

    /// The validator index has already voted this process instance.
    #[error("duplicate vote for index {0}")]
    DuplicateVote(u32),

    /// The reporting validator is not part of the captured participant list.
    #[error("validator {0} is not a captured participant")]
    UnknownValidator(AccountAddress),

    /// The claimed vote index does not match the validator's position in the
    /// captured participant list.
    #[error("vote index mismatch: {0}")]
    IndexMismatch(Mismatch<u32>),
}

#[derive(Debug, Clone, Error)]
pub enum MultisigError {
    /// The signature slot index is outside the participant list.
    #[error("signature index {idx} out of range for {len} participants")]
    IndexOutOfRange { idx: u32, len: u32 },

    /// The signature slot for this participant is already filled.
    #[error("signature slot {0} already filled")]
    SlotOccupied(u32),

    /// Not enough signatures were collected to assemble a spend.
    #[error("insufficient signatures: have {got}, need {need}")]
    Incomplete { got: u32, need: u32 },
}
