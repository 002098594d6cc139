//! Frozen validator participant snapshots.
//!
//! The participant list and quorum threshold are captured once when a process
//! reserves a tracker, and persisted with it. A live validator-set rotation
//! therefore cannot shift vote indices of an in-flight process.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use pegbridge_primitives::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::TrackerError;

/// Computes the vote/signature quorum for a validator set of size `n`.
///
/// The same `floor(2n/3) + 1` figure gates both multisig assembly and
/// finality-vote settlement.
pub fn quorum_threshold(n: u32) -> u32 {
    n * 2 / 3 + 1
}

/// One captured validator: its ledger identity and its script address on the
/// external chain.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Arbitrary,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct ParticipantEntry {
    address: AccountAddress,
    script_address: ScriptAddress,
}

impl ParticipantEntry {
    pub fn new(address: AccountAddress, script_address: ScriptAddress) -> Self {
        Self {
            address,
            script_address,
        }
    }

    pub fn address(&self) -> &AccountAddress {
        &self.address
    }

    pub fn script_address(&self) -> &ScriptAddress {
        &self.script_address
    }
}

/// Ordered, immutable participant snapshot for one process instance.
///
/// Positions in this table are the vote indices and the multisig signature
/// slots for the lifetime of the process.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ParticipantTable {
    entries: Vec<ParticipantEntry>,
    threshold: u32,
}

impl ParticipantTable {
    /// Captures a snapshot from the provider's current validator set.
    ///
    /// Fails if the set is empty; the threshold is fixed to
    /// [`quorum_threshold`] of the set size.
    pub fn from_entries(entries: Vec<ParticipantEntry>) -> Result<Self, TrackerError> {
        if entries.is_empty() {
            return Err(TrackerError::EmptyValidatorSet);
        }
        let threshold = quorum_threshold(entries.len() as u32);
        Ok(Self { entries, threshold })
    }

    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn entries(&self) -> &[ParticipantEntry] {
        &self.entries
    }

    pub fn get(&self, idx: u32) -> Option<&ParticipantEntry> {
        self.entries.get(idx as usize)
    }

    /// Resolves a validator's position in the snapshot.
    pub fn index_of(&self, address: &AccountAddress) -> Option<u32> {
        self.entries
            .iter()
            .position(|e| e.address() == address)
            .map(|i| i as u32)
    }
}

#[cfg(test)]
mod tests {
    use pegbridge_test_utils::ArbitraryGenerator;

    use super::*;

    fn gen_entries(n: usize) -> Vec<ParticipantEntry> {
        let mut gen = ArbitraryGenerator::new();
        (0..n).map(|_| gen.generate()).collect()
    }

    #[test]
    fn test_quorum_threshold_values() {
        // (n, expected floor(2n/3)+1)
        let cases = [(1, 1), (2, 2), (3, 3), (4, 3), (5, 4), (6, 5), (7, 5), (9, 7), (10, 7)];
        for (n, expected) in cases {
            assert_eq!(quorum_threshold(n), expected, "n={n}");
        }
    }

    #[test]
    fn test_snapshot_rejects_empty_set() {
        assert!(matches!(
            ParticipantTable::from_entries(Vec::new()),
            Err(TrackerError::EmptyValidatorSet)
        ));
    }

    #[test]
    fn test_index_resolution() {
        let entries = gen_entries(4);
        let table = ParticipantTable::from_entries(entries.clone()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.threshold(), 3);
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(table.index_of(e.address()), Some(i as u32));
        }

        let outsider: ParticipantEntry = ArbitraryGenerator::new().generate();
        assert_eq!(table.index_of(outsider.address()), None);
    }
}
