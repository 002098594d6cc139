//! Errors during parsing/handling/conversion of primitives.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A byte slice had the wrong length for the target buffer type.
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// A raw external transaction failed consensus decoding.
    #[error("malformed external transaction")]
    MalformedTx,
}

#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    /// The compressed pubkey bytes do not describe a curve point.
    #[error("invalid pubkey encoding")]
    InvalidPubkey,

    /// The compact signature bytes could not be decoded.
    #[error("malformed signature encoding")]
    MalformedSignature,

    /// The signature did not verify against the pubkey and digest.
    #[error("signature verification failed")]
    BadSignature,
}
