use pegbridge_db::DbError;
use pegbridge_tracker_types::{MultisigError, TrackerName};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    /// The tracker no longer matches the state the job was created against;
    /// broadcasting would act on stale data, so the job aborts.
    #[error("stale tracker state: {0}")]
    Stale(String),

    /// The tracker store failed.
    #[error("store error: {0}")]
    Db(#[from] DbError),

    /// The signature set cannot assemble a spend yet.
    #[error("multisig error: {0}")]
    Multisig(#[from] MultisigError),

    /// No lock script is known for the tracker's custody output.
    #[error("no lock script for tracker {0}")]
    MissingLockScript(TrackerName),

    /// Spending script assembly failed.
    #[error("script assembly failed: {0}")]
    Script(String),

    /// The pending external transaction failed to decode.
    #[error("malformed pending transaction: {0}")]
    Decode(String),

    /// The external chain driver refused or failed the broadcast.
    #[error("chain broadcast failed: {0}")]
    Chain(String),

    /// Re-injecting the internal completion transaction failed.
    #[error("internal broadcast failed: {0}")]
    Submit(String),
}
