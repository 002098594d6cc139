//! The closed set of bridge transaction kinds.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type tag carried in every transaction envelope, used for handler dispatch
/// and for the `tx.type` response tag.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum TxType {
    /// Deposit external funds into custody; mints once finalized.
    Lock,

    /// Release custody back to the user; burns once finalized.
    Redeem,

    /// A validator's attestation that the custody transaction was observed.
    ReportFinality,

    /// Internal bookkeeping report that the signed custody transaction was
    /// broadcast to the external chain.
    BroadcastSuccess,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Lock => "LOCK",
            TxType::Redeem => "REDEEM",
            TxType::ReportFinality => "REPORT_FINALITY",
            TxType::BroadcastSuccess => "BROADCAST_SUCCESS",
        }
    }
}

impl ::core::fmt::Display for TxType {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.write_str(self.as_str())
    }
}
