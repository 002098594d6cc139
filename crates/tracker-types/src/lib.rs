//! Custody tracker state machine for one external-chain asset.
//!
//! A [`Tracker`] bridges a single external-chain custody address to the local
//! ledger. It owns one lock/redeem cycle at a time: a process reserves the
//! tracker, captures a frozen validator participant snapshot, accumulates
//! multisig signatures and finality votes, and settles exactly once when the
//! vote quorum is reached.
//!
//! The types here are pure state; the transaction handlers in
//! `pegbridge-handlers` drive the transitions.

mod errors;
mod multisig;
mod participant;
mod tracker;
mod votes;

pub use errors::{Mismatch, MultisigError, TrackerError, VoteError};
pub use multisig::MultisigAssembler;
pub use participant::{quorum_threshold, ParticipantEntry, ParticipantTable};
pub use tracker::{ProcessKind, ProcessState, Tracker, TrackerName, TrackerState};
pub use votes::VoteLedger;
