//! Envelope signature primitives.
//!
//! Transactions entering the handler pipeline carry ECDSA signatures over the
//! SHA-256 digest of the raw envelope bytes. Verification happens during the
//! stateless `validate` stage; signing lives here too so client-side tooling
//! and tests share one implementation.

use secp256k1::{ecdsa::Signature, Message, PublicKey, SecretKey, SECP256K1};
use sha2::{Digest, Sha256};

use crate::{
    buf::{Buf32, Buf33, Buf64},
    errors::CryptoError,
};

/// Computes the signing digest for a raw envelope payload.
pub fn payload_digest(payload: &[u8]) -> Buf32 {
    let digest = Sha256::digest(payload);
    Buf32::new(digest.into())
}

/// Signs a digest with the given secret key, returning a compact signature.
pub fn sign_digest(sk: &SecretKey, digest: &Buf32) -> Buf64 {
    let msg = Message::from_digest(*digest.as_ref());
    let sig = SECP256K1.sign_ecdsa(&msg, sk);
    Buf64::new(sig.serialize_compact())
}

/// Verifies a compact signature over a digest against a compressed pubkey.
pub fn verify_sig(pubkey: &Buf33, digest: &Buf32, sig: &Buf64) -> Result<(), CryptoError> {
    let pk = PublicKey::from_slice(pubkey.as_bytes()).map_err(|_| CryptoError::InvalidPubkey)?;
    let sig =
        Signature::from_compact(sig.as_bytes()).map_err(|_| CryptoError::MalformedSignature)?;
    let msg = Message::from_digest(*digest.as_ref());
    SECP256K1
        .verify_ecdsa(&msg, &sig, &pk)
        .map_err(|_| CryptoError::BadSignature)
}

/// Returns the compressed pubkey for a secret key.
pub fn pubkey_for(sk: &SecretKey) -> Buf33 {
    let pk = PublicKey::from_secret_key(SECP256K1, sk);
    Buf33::new(pk.serialize())
}
