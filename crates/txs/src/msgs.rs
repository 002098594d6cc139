//! Bridge transaction payloads.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use pegbridge_primitives::prelude::*;
use pegbridge_tracker_types::TrackerName;
use serde::{Deserialize, Serialize};

use crate::{errors::TxError, response::KvPair, tx_type::TxType};

/// Common surface of every bridge transaction payload: its type tag, its
/// declared signer set and the indexing tags it emits.
pub trait Payload: BorshSerialize + BorshDeserialize {
    const TX_TYPE: TxType;

    fn signers(&self) -> Vec<AccountAddress>;

    fn tags(&self) -> Vec<KvPair>;
}

/// Encodes a payload for embedding into a raw transaction envelope.
pub fn encode_payload<P: Payload>(payload: &P) -> Vec<u8> {
    borsh::to_vec(payload).expect("payload serialization is infallible")
}

/// Decodes an envelope payload as the given transaction kind.
pub fn decode_payload<P: Payload>(bytes: &[u8]) -> Result<P, TxError> {
    borsh::from_slice(bytes).map_err(|e| TxError::WrongTxType(e.to_string()))
}

/// Deposits external-chain funds into custody.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Lock {
    pub locker: AccountAddress,
    pub tracker_name: TrackerName,

    /// The user-signed external transaction that moves funds into custody.
    pub external_tx: RawExternalTx,

    pub lock_amount: SatAmount,
}

impl Payload for Lock {
    const TX_TYPE: TxType = TxType::Lock;

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.locker]
    }

    fn tags(&self) -> Vec<KvPair> {
        vec![
            KvPair::new("tx.type", Self::TX_TYPE.as_str()),
            KvPair::new("tx.locker", self.locker.to_string()),
            KvPair::new("tx.tracker_name", self.tracker_name.to_string()),
        ]
    }
}

/// Releases custody back to the user.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Redeem {
    pub redeemer: AccountAddress,
    pub tracker_name: TrackerName,

    /// The external transaction releasing the custody output.
    pub external_tx: RawExternalTx,

    pub redeem_amount: SatAmount,
}

impl Payload for Redeem {
    const TX_TYPE: TxType = TxType::Redeem;

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.redeemer]
    }

    fn tags(&self) -> Vec<KvPair> {
        vec![
            KvPair::new("tx.type", Self::TX_TYPE.as_str()),
            KvPair::new("tx.owner", self.redeemer.to_string()),
            KvPair::new("tx.tracker_name", self.tracker_name.to_string()),
        ]
    }
}

/// A validator's attestation that the pending custody transaction was
/// observed/confirmed on the external chain.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ReportFinality {
    pub tracker_name: TrackerName,

    /// Beneficiary of the settled process.
    pub locker: AccountAddress,

    pub validator_address: AccountAddress,

    /// The validator's position in the captured participant list.
    pub vote_index: i64,

    pub refund: bool,
}

impl Payload for ReportFinality {
    const TX_TYPE: TxType = TxType::ReportFinality;

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.validator_address]
    }

    fn tags(&self) -> Vec<KvPair> {
        vec![
            KvPair::new("tx.type", Self::TX_TYPE.as_str()),
            KvPair::new("tx.owner", self.locker.to_string()),
            KvPair::new("tx.tracker_name", self.tracker_name.to_string()),
            KvPair::new("tx.validator", self.validator_address.to_string()),
        ]
    }
}

/// Internal report that the fully signed custody transaction was broadcast.
///
/// Submitted by the broadcast job, not by users; advances the tracker's
/// custody chain and recycles it for the next process.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct BroadcastSuccess {
    pub tracker_name: TrackerName,

    /// The validator whose job observed the successful broadcast.
    pub reporter: AccountAddress,

    /// Id of the broadcast external transaction, the new custody-chain tip.
    pub external_txid: ExternalTxid,
}

impl Payload for BroadcastSuccess {
    const TX_TYPE: TxType = TxType::BroadcastSuccess;

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.reporter]
    }

    fn tags(&self) -> Vec<KvPair> {
        vec![
            KvPair::new("tx.type", Self::TX_TYPE.as_str()),
            KvPair::new("tx.tracker_name", self.tracker_name.to_string()),
            KvPair::new("tx.validator", self.reporter.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pegbridge_test_utils::ArbitraryGenerator;

    use super::*;

    #[test]
    fn test_payload_codec_roundtrip() {
        let lock: Lock = ArbitraryGenerator::new().generate();
        let bytes = encode_payload(&lock);
        let back: Lock = decode_payload(&bytes).unwrap();
        assert_eq!(lock, back);
    }

    #[test]
    fn test_decode_wrong_type_fails() {
        let report: ReportFinality = ArbitraryGenerator::new().generate();
        let bytes = encode_payload(&report);
        // A finality report payload is not a valid lock payload.
        assert!(matches!(
            decode_payload::<Lock>(&bytes),
            Err(TxError::WrongTxType(_))
        ));
    }

    #[test]
    fn test_every_payload_tags_its_type() {
        let mut gen = ArbitraryGenerator::new();
        let lock: Lock = gen.generate();
        let redeem: Redeem = gen.generate();
        let report: ReportFinality = gen.generate();
        let success: BroadcastSuccess = gen.generate();

        for tags in [lock.tags(), redeem.tags(), report.tags(), success.tags()] {
            assert!(tags.iter().any(|t| t.key == "tx.type"));
        }
    }
}
