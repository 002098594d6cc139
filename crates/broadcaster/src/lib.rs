//! Asynchronous broadcast of fully-signed custody transactions.
//!
//! The broadcast job runs outside the block-ordered transaction pipeline. It
//! assembles the spending script from the collected multisig signatures,
//! pushes the finalized transaction to the external chain through a
//! per-chain driver, and reports success back into the ledger as an internal
//! `BroadcastSuccess` transaction. Failures are retried up to a bounded
//! count, then surfaced as terminally failed; they are never silently
//! dropped.

mod driver;
mod errors;
mod job;

pub use driver::{
    assemble_spend_script, attach_script_to_first_input, decode_external_tx, ChainDriver,
    InternalBroadcaster, LockScriptProvider,
};
pub use errors::BroadcastError;
pub use job::{BroadcastContext, BroadcastJob, JobStatus};
