//! The bridge transaction error taxonomy.

use pegbridge_db::DbError;
use pegbridge_ledger_types::LedgerError;
use pegbridge_tracker_types::{TrackerError, TrackerName, VoteError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TxError {
    /// The payload did not deserialize as the declared transaction type.
    #[error("wrong tx type: {0}")]
    WrongTxType(String),

    /// A required field is absent or structurally invalid.
    #[error("missing or invalid data: {0}")]
    MissingData(String),

    /// Signer set or signature verification failed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The offered fee does not meet the configured minimum.
    #[error("insufficient fee: {0}")]
    InsufficientFee(String),

    /// The tracker is unknown or already owned by an in-flight process.
    #[error("tracker not available: {0}")]
    TrackerUnavailable(TrackerName),

    /// The embedded external transaction violates a tracker invariant.
    #[error("tracker mismatch: {0}")]
    TrackerMismatch(#[from] TrackerError),

    /// Finality-vote bookkeeping failed (duplicate vote, bad index, unknown
    /// voter).
    #[error("vote rejected: {0}")]
    VoteRejected(#[from] VoteError),

    /// The balance ledger refused the mint/burn/fee effect.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The tracker store failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),
}
