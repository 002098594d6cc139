//! Bridge transaction handlers.
//!
//! Every bridge transaction kind implements the same four-operation contract
//! used by the surrounding ledger pipeline:
//!
//! - `validate`: stateless structural checks, no store access beyond reads
//!   needed for invariant checks, no mutation;
//! - `process_check`: speculative application for pre-acceptance filtering,
//!   never commits;
//! - `process_deliver`: authoritative application, the single commit point;
//! - `process_fee`: size-proportional fee deduction.
//!
//! Handlers are dispatched through an explicit [`HandlerRegistry`] built once
//! at startup. Transactions within a block are applied strictly sequentially
//! against the shared stores, so handlers perform plain read-modify-write
//! cycles without internal locking.

mod broadcast_success;
mod context;
mod executor;
mod fees;
mod finality;
mod lock;
mod redeem;
mod registry;

pub use broadcast_success::BroadcastSuccessHandler;
pub use context::{HandlerContext, ValidatorSetProvider};
pub use fees::basic_fee_handling;
pub use finality::FinalityHandler;
pub use lock::LockHandler;
pub use redeem::RedeemHandler;
pub use registry::{HandlerRegistry, TxHandler, TxOutcome};
