//! The signed transaction envelope and its structural checks.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use pegbridge_ledger_types::Coin;
use pegbridge_primitives::{
    crypto::{payload_digest, pubkey_for, sign_digest, verify_sig},
    prelude::*,
};
use secp256k1::SecretKey;
use serde::{Deserialize, Serialize};

use crate::{errors::TxError, tx_type::TxType};

/// Fee offered with a transaction: a price per gas unit and a gas bound.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Fee {
    pub price: Coin,
    pub gas: u64,
}

/// One signer's contribution to the envelope: its compressed pubkey and a
/// compact signature over the raw envelope bytes.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct EnvelopeSignature {
    pub pubkey: Buf33,
    pub sig: Buf64,
}

/// An unsigned bridge transaction.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct RawTx {
    pub tx_type: TxType,
    pub payload: Vec<u8>,
    pub fee: Fee,
    pub memo: String,
}

impl RawTx {
    /// The canonical bytes signers commit to.
    pub fn raw_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("raw tx serialization is infallible")
    }
}

/// A raw transaction plus the signatures of its declared signers.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct SignedTx {
    pub raw: RawTx,
    pub signatures: Vec<EnvelopeSignature>,
}

/// Signs a raw transaction with the given keys, in declared-signer order.
pub fn sign_raw_tx(raw: RawTx, keys: &[SecretKey]) -> SignedTx {
    let digest = payload_digest(&raw.raw_bytes());
    let signatures = keys
        .iter()
        .map(|sk| EnvelopeSignature {
            pubkey: pubkey_for(sk),
            sig: sign_digest(sk, &digest),
        })
        .collect();
    SignedTx { raw, signatures }
}

/// Verifies the envelope signature set against the declared signers.
///
/// Each declared signer must be covered, in order, by a signature whose
/// pubkey hashes to the signer's address and verifies over the raw envelope
/// bytes. Stateless; never touches a store.
pub fn validate_basic(
    raw_bytes: &[u8],
    signers: &[AccountAddress],
    signatures: &[EnvelopeSignature],
) -> Result<(), TxError> {
    if signatures.len() != signers.len() {
        return Err(TxError::InvalidSignature(format!(
            "expected {} signatures, got {}",
            signers.len(),
            signatures.len()
        )));
    }

    let digest = payload_digest(raw_bytes);
    for (signer, envelope_sig) in signers.iter().zip(signatures) {
        let derived = AccountAddress::from_pubkey(&envelope_sig.pubkey);
        if derived != *signer {
            return Err(TxError::InvalidSignature(format!(
                "signature pubkey does not belong to declared signer {signer}"
            )));
        }
        verify_sig(&envelope_sig.pubkey, &digest, &envelope_sig.sig)
            .map_err(|e| TxError::InvalidSignature(e.to_string()))?;
    }

    Ok(())
}

/// Checks the offered fee against the configured minimum.
pub fn validate_fee(min_fee: &Coin, fee: &Fee) -> Result<(), TxError> {
    if fee.price.currency() != min_fee.currency() {
        return Err(TxError::InsufficientFee(format!(
            "fee must be paid in {}, got {}",
            min_fee.currency(),
            fee.price.currency()
        )));
    }
    if fee.price.amount() < min_fee.amount() {
        return Err(TxError::InsufficientFee(format!(
            "fee price {} below minimum {}",
            fee.price, min_fee
        )));
    }
    if fee.gas == 0 {
        return Err(TxError::InsufficientFee("zero gas offered".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pegbridge_ledger_types::LedgerAmount;
    use pegbridge_test_utils::ArbitraryGenerator;

    use super::*;

    fn keypair(byte: u8) -> (SecretKey, AccountAddress) {
        let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
        let address = AccountAddress::from_pubkey(&pubkey_for(&sk));
        (sk, address)
    }

    fn some_raw_tx() -> RawTx {
        let mut gen = ArbitraryGenerator::new();
        RawTx {
            tx_type: TxType::Lock,
            payload: gen.generate(),
            fee: Fee {
                price: Coin::new("NVT", LedgerAmount::new(10)),
                gas: 100,
            },
            memo: String::new(),
        }
    }

    #[test]
    fn test_validate_basic_accepts_signed_envelope() {
        let (sk, address) = keypair(0x11);
        let stx = sign_raw_tx(some_raw_tx(), &[sk]);
        assert!(validate_basic(&stx.raw.raw_bytes(), &[address], &stx.signatures).is_ok());
    }

    #[test]
    fn test_validate_basic_rejects_signer_mismatch() {
        let (sk, _) = keypair(0x11);
        let (_, other_address) = keypair(0x22);
        let stx = sign_raw_tx(some_raw_tx(), &[sk]);
        let err = validate_basic(&stx.raw.raw_bytes(), &[other_address], &stx.signatures)
            .unwrap_err();
        assert!(matches!(err, TxError::InvalidSignature(_)));
    }

    #[test]
    fn test_validate_basic_rejects_tampered_payload() {
        let (sk, address) = keypair(0x11);
        let stx = sign_raw_tx(some_raw_tx(), &[sk]);

        let mut tampered = stx.raw.clone();
        tampered.memo = "changed after signing".to_owned();
        let err =
            validate_basic(&tampered.raw_bytes(), &[address], &stx.signatures).unwrap_err();
        assert!(matches!(err, TxError::InvalidSignature(_)));
    }

    #[test]
    fn test_validate_basic_rejects_count_mismatch() {
        let (sk, address) = keypair(0x11);
        let stx = sign_raw_tx(some_raw_tx(), &[sk]);
        let err = validate_basic(&stx.raw.raw_bytes(), &[address], &[]).unwrap_err();
        assert!(matches!(err, TxError::InvalidSignature(_)));
    }

    #[test]
    fn test_validate_fee() {
        let min = Coin::new("NVT", LedgerAmount::new(10));
        let ok = Fee {
            price: Coin::new("NVT", LedgerAmount::new(10)),
            gas: 1,
        };
        assert!(validate_fee(&min, &ok).is_ok());

        let low = Fee {
            price: Coin::new("NVT", LedgerAmount::new(9)),
            gas: 1,
        };
        assert!(matches!(
            validate_fee(&min, &low),
            Err(TxError::InsufficientFee(_))
        ));

        let wrong_currency = Fee {
            price: Coin::new("BTC", LedgerAmount::new(100)),
            gas: 1,
        };
        assert!(matches!(
            validate_fee(&min, &wrong_currency),
            Err(TxError::InsufficientFee(_))
        ));
    }
}
