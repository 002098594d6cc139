//! External-chain transaction references and the raw transaction wrapper.

use arbitrary::Arbitrary;
use bitcoin::{
    absolute::LockTime,
    consensus::{deserialize, encode, serialize},
    hashes::Hash,
    transaction::Version,
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::buf::Buf32;

/// Id of a transaction on the external chain.
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
pub struct ExternalTxid(Buf32);

impl_buf_wrapper!(ExternalTxid, Buf32, 32);

impl From<Txid> for ExternalTxid {
    fn from(value: Txid) -> Self {
        Self(Buf32::new(value.to_byte_array()))
    }
}

impl From<ExternalTxid> for Txid {
    fn from(value: ExternalTxid) -> Self {
        Txid::from_byte_array(value.0.into())
    }
}

/// Reference to a specific output of an external-chain transaction.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Arbitrary,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct OutputRef {
    txid: ExternalTxid,
    vout: u32,
}

impl OutputRef {
    pub fn new(txid: ExternalTxid, vout: u32) -> Self {
        Self { txid, vout }
    }

    pub fn txid(&self) -> &ExternalTxid {
        &self.txid
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: (*self.txid()).into(),
            vout: self.vout,
        }
    }
}

impl From<OutPoint> for OutputRef {
    fn from(value: OutPoint) -> Self {
        Self {
            txid: value.txid.into(),
            vout: value.vout,
        }
    }
}

impl ::core::fmt::Display for OutputRef {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Represents a raw, byte-encoded external-chain transaction with custom
/// [`Arbitrary`] support. Provides conversions (via [`TryFrom`]) to and from
/// [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RawExternalTx(Vec<u8>);

impl RawExternalTx {
    /// Creates a new `RawExternalTx` from a raw byte vector.
    pub fn from_raw_bytes(bytes: Vec<u8>) -> Self {
        RawExternalTx(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Transaction> for RawExternalTx {
    fn from(value: Transaction) -> Self {
        Self(serialize(&value))
    }
}

impl TryFrom<RawExternalTx> for Transaction {
    type Error = encode::Error;
    fn try_from(value: RawExternalTx) -> Result<Self, Self::Error> {
        deserialize(&value.0)
    }
}

impl TryFrom<&RawExternalTx> for Transaction {
    type Error = encode::Error;
    fn try_from(value: &RawExternalTx) -> Result<Self, Self::Error> {
        deserialize(&value.0)
    }
}

impl<'a> Arbitrary<'a> for RawExternalTx {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Random number of inputs and outputs (bounded for simplicity)
        let input_count = u.int_in_range::<usize>(1..=4)?;
        let output_count = u.int_in_range::<usize>(1..=4)?;

        // Build random inputs
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let mut txid_bytes = [0u8; 32];
            u.fill_buffer(&mut txid_bytes)?;
            let txid = Txid::from_byte_array(txid_bytes);

            let vout = u32::arbitrary(u)?;

            let script_sig_size = u.int_in_range::<usize>(0..=50)?;
            let script_sig_bytes = u.bytes(script_sig_size)?;
            let script_sig = ScriptBuf::from_bytes(script_sig_bytes.to_vec());

            inputs.push(TxIn {
                previous_output: OutPoint { txid, vout },
                script_sig,
                sequence: Sequence::MAX,
                witness: Witness::default(),
            });
        }

        // Build random outputs
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let value = Amount::from_sat(u64::arbitrary(u)?);

            let script_pubkey_size = u.int_in_range::<usize>(0..=50)?;
            let script_pubkey_bytes = u.bytes(script_pubkey_size)?;
            let script_pubkey = ScriptBuf::from(script_pubkey_bytes.to_vec());

            outputs.push(TxOut {
                value,
                script_pubkey,
            });
        }

        let tx = Transaction {
            version: Version::ONE,
            lock_time: LockTime::ZERO,
            input: inputs,
            output: outputs,
        };

        Ok(tx.into())
    }
}
