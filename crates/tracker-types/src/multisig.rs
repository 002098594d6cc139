//! M-of-N signature assembly over one pending external transaction.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::MultisigError;

/// Collects external-chain signatures from the captured participants.
///
/// Slots are index-aligned with the process's participant snapshot and filled
/// asynchronously, off the transaction path. The assembled spend becomes
/// eligible only once `threshold` slots are filled.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct MultisigAssembler {
    threshold: u32,

    /// One slot per participant index; `None` until that participant signs.
    signatures: Vec<Option<Vec<u8>>>,
}

impl MultisigAssembler {
    /// Creates an empty assembler for `n` participants.
    pub fn new(n: u32, threshold: u32) -> Self {
        Self {
            threshold,
            signatures: vec![None; n as usize],
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn participant_count(&self) -> u32 {
        self.signatures.len() as u32
    }

    pub fn signature_count(&self) -> u32 {
        self.signatures.iter().filter(|s| s.is_some()).count() as u32
    }

    /// Records a participant's signature in its slot.
    ///
    /// A filled slot is never overwritten; re-submissions fail.
    pub fn add_signature(&mut self, idx: u32, sig: Vec<u8>) -> Result<(), MultisigError> {
        let len = self.participant_count();
        let slot = self
            .signatures
            .get_mut(idx as usize)
            .ok_or(MultisigError::IndexOutOfRange { idx, len })?;
        if slot.is_some() {
            return Err(MultisigError::SlotOccupied(idx));
        }
        *slot = Some(sig);
        Ok(())
    }

    /// Whether enough signatures were collected to assemble a spend.
    pub fn is_complete(&self) -> bool {
        self.signature_count() >= self.threshold
    }

    /// Returns the first `threshold` collected signatures in participant-index
    /// order, or fails if the set is still incomplete.
    pub fn collected(&self) -> Result<Vec<(u32, &[u8])>, MultisigError> {
        if !self.is_complete() {
            return Err(MultisigError::Incomplete {
                got: self.signature_count(),
                need: self.threshold,
            });
        }
        Ok(self
            .signatures
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_deref().map(|sig| (i as u32, sig)))
            .take(self.threshold as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_signature_fills_slots() {
        let mut ms = MultisigAssembler::new(4, 3);
        assert_eq!(ms.signature_count(), 0);
        assert!(!ms.is_complete());

        ms.add_signature(1, vec![0xaa]).unwrap();
        ms.add_signature(3, vec![0xbb]).unwrap();
        assert_eq!(ms.signature_count(), 2);
        assert!(!ms.is_complete());

        ms.add_signature(0, vec![0xcc]).unwrap();
        assert!(ms.is_complete());
    }

    #[test]
    fn test_add_signature_rejects_duplicates_and_range() {
        let mut ms = MultisigAssembler::new(2, 2);
        ms.add_signature(0, vec![1]).unwrap();
        assert!(matches!(
            ms.add_signature(0, vec![2]),
            Err(MultisigError::SlotOccupied(0))
        ));
        assert!(matches!(
            ms.add_signature(2, vec![3]),
            Err(MultisigError::IndexOutOfRange { idx: 2, len: 2 })
        ));
    }

    #[test]
    fn test_collected_orders_by_index() {
        let mut ms = MultisigAssembler::new(4, 3);
        ms.add_signature(3, vec![3]).unwrap();
        ms.add_signature(0, vec![0]).unwrap();
        ms.add_signature(2, vec![2]).unwrap();
        ms.add_signature(1, vec![1]).unwrap();

        let collected = ms.collected().unwrap();
        // First `threshold` signatures in participant-index order.
        assert_eq!(collected.len(), 3);
        assert_eq!(
            collected.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_collected_incomplete() {
        let mut ms = MultisigAssembler::new(4, 3);
        ms.add_signature(1, vec![1]).unwrap();
        assert!(matches!(
            ms.collected(),
            Err(MultisigError::Incomplete { got: 1, need: 3 })
        ));
    }
}
