//! Bridge transaction wire shapes and structural validation.
//!
//! This crate defines the closed set of bridge transaction kinds, the signed
//! envelope they travel in, and the stateless checks the pipeline runs before
//! any store is touched. Stateful processing lives in `pegbridge-handlers`.

mod envelope;
mod errors;
mod msgs;
mod response;
mod tx_type;

pub use envelope::{
    sign_raw_tx, validate_basic, validate_fee, EnvelopeSignature, Fee, RawTx, SignedTx,
};
pub use errors::TxError;
pub use msgs::{decode_payload, encode_payload, BroadcastSuccess, Lock, Payload, Redeem, ReportFinality};
pub use response::{KvPair, Response};
pub use tx_type::TxType;
