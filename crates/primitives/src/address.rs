//! Address types for the local ledger and the external chain.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::buf::{Buf20, Buf33};

/// Address of an account on the local ledger.
///
/// Derived from the first 20 bytes of the SHA-256 digest of the account's
/// compressed public key.
#[derive(
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct AccountAddress(Buf20);

impl_buf_wrapper!(AccountAddress, Buf20, 20);

impl AccountAddress {
    /// Derives the address of the account controlled by the given pubkey.
    pub fn from_pubkey(pubkey: &Buf33) -> Self {
        let digest = Sha256::digest(pubkey.as_bytes());
        let mut short = [0u8; 20];
        short.copy_from_slice(&digest[..20]);
        Self(Buf20::new(short))
    }
}

/// A validator's script address on the external chain, used as a multisig
/// participant identity when assembling the spending script.
#[derive(
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct ScriptAddress(Buf20);

impl_buf_wrapper!(ScriptAddress, Buf20, 20);

#[cfg(test)]
mod tests {
    use pegbridge_test_utils::ArbitraryGenerator;

    use super::*;

    #[test]
    fn test_address_derivation_is_deterministic() {
        let pk: Buf33 = ArbitraryGenerator::new().generate();
        assert_eq!(AccountAddress::from_pubkey(&pk), AccountAddress::from_pubkey(&pk));
    }

    #[test]
    fn test_address_derivation_differs_by_key() {
        let mut gen = ArbitraryGenerator::new();
        let a: Buf33 = gen.generate();
        let b: Buf33 = gen.generate();
        assert_ne!(a, b, "generator produced identical keys");
        assert_ne!(
            AccountAddress::from_pubkey(&a),
            AccountAddress::from_pubkey(&b)
        );
    }
}
