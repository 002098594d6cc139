//! Per-process finality vote accounting.

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::VoteError;

/// Records one finality vote per captured participant index.
///
/// Votes are write-once: a second vote from the same index is rejected rather
/// than overwritten, so a validator cannot move the tally after the fact.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct VoteLedger {
    threshold: u32,

    /// One slot per participant index; `None` until that validator votes.
    votes: Vec<Option<bool>>,
}

impl VoteLedger {
    /// Creates an empty ledger for `n` participants.
    pub fn new(n: u32, threshold: u32) -> Self {
        Self {
            threshold,
            votes: vec![None; n as usize],
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn participant_count(&self) -> u32 {
        self.votes.len() as u32
    }

    pub fn has_voted(&self, idx: u32) -> bool {
        self.votes
            .get(idx as usize)
            .map(|v| v.is_some())
            .unwrap_or(false)
    }

    /// Records a vote at the given participant index.
    pub fn add_vote(&mut self, idx: u32, value: bool) -> Result<(), VoteError> {
        let len = self.participant_count();
        let slot = self
            .votes
            .get_mut(idx as usize)
            .ok_or(VoteError::IndexOutOfRange {
                idx: idx as i64,
                len,
            })?;
        if slot.is_some() {
            return Err(VoteError::DuplicateVote(idx));
        }
        *slot = Some(value);
        Ok(())
    }

    pub fn yes_count(&self) -> u32 {
        self.votes.iter().filter(|v| **v == Some(true)).count() as u32
    }

    pub fn no_count(&self) -> u32 {
        self.votes.iter().filter(|v| **v == Some(false)).count() as u32
    }

    /// Whether the yes tally has reached the settlement quorum.
    pub fn has_quorum(&self) -> bool {
        self.yes_count() >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_and_quorum_boundary() {
        // N = 4 → threshold 3. At exactly threshold-1 yes votes there is no
        // quorum; one more tips it.
        let mut votes = VoteLedger::new(4, 3);
        votes.add_vote(0, true).unwrap();
        votes.add_vote(1, true).unwrap();
        assert_eq!(votes.yes_count(), 2);
        assert!(!votes.has_quorum());

        votes.add_vote(2, true).unwrap();
        assert_eq!(votes.yes_count(), 3);
        assert!(votes.has_quorum());
    }

    #[test]
    fn test_no_votes_do_not_count_towards_quorum() {
        let mut votes = VoteLedger::new(4, 3);
        votes.add_vote(0, true).unwrap();
        votes.add_vote(1, false).unwrap();
        votes.add_vote(2, false).unwrap();
        assert_eq!(votes.yes_count(), 1);
        assert_eq!(votes.no_count(), 2);
        assert!(!votes.has_quorum());
    }

    #[test]
    fn test_duplicate_vote_rejected_tally_unchanged() {
        let mut votes = VoteLedger::new(4, 3);
        votes.add_vote(1, true).unwrap();
        let err = votes.add_vote(1, false).unwrap_err();
        assert!(matches!(err, VoteError::DuplicateVote(1)));
        assert_eq!(votes.yes_count(), 1);
        assert_eq!(votes.no_count(), 0);
    }

    #[test]
    fn test_out_of_range_vote() {
        let mut votes = VoteLedger::new(4, 3);
        assert!(matches!(
            votes.add_vote(4, true),
            Err(VoteError::IndexOutOfRange { idx: 4, len: 4 })
        ));
    }
}
