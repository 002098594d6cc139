//! The per-asset custody tracker and its process lifecycle.

use arbitrary::Arbitrary;
use bitcoin::Transaction;
use borsh::{BorshDeserialize, BorshSerialize};
use pegbridge_primitives::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Mismatch, TrackerError, VoteError},
    multisig::MultisigAssembler,
    participant::ParticipantTable,
    votes::VoteLedger,
};

/// Unique name of a custody tracker, immutable after creation.
#[derive(
    Clone,
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
pub struct TrackerName(String);

impl TrackerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ::core::fmt::Display for TrackerName {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackerName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Lifecycle state of a tracker.
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
pub enum TrackerState {
    /// No in-flight process; accepts a new lock or redeem.
    Available,

    /// A lock or redeem has reserved the tracker; accepts finality votes only.
    Processing,

    /// Quorum reached and the balance effect applied; terminal for this
    /// process instance until the tracker is recycled.
    Released,
}

/// Which operation currently owns the tracker.
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
pub enum ProcessKind {
    Lock,
    Redeem,
}

impl ProcessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::Lock => "lock",
            ProcessKind::Redeem => "redeem",
        }
    }
}

/// Everything owned by one process instance: the frozen participant snapshot,
/// the pending external transaction, the signature set and the vote ledger.
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ProcessState {
    kind: ProcessKind,

    /// The user that initiated the in-flight operation.
    owner: AccountAddress,

    /// Pending custody balance, committed when the process settles.
    balance: SatAmount,

    /// The (partially signed) external transaction under construction.
    raw_tx: RawExternalTx,

    /// Participant snapshot frozen at process start.
    participants: ParticipantTable,

    multisig: MultisigAssembler,

    votes: VoteLedger,
}

impl ProcessState {
    pub fn kind(&self) -> ProcessKind {
        self.kind
    }

    pub fn owner(&self) -> &AccountAddress {
        &self.owner
    }

    pub fn balance(&self) -> SatAmount {
        self.balance
    }

    pub fn raw_tx(&self) -> &RawExternalTx {
        &self.raw_tx
    }

    pub fn participants(&self) -> &ParticipantTable {
        &self.participants
    }

    pub fn multisig(&self) -> &MultisigAssembler {
        &self.multisig
    }

    pub fn multisig_mut(&mut self) -> &mut MultisigAssembler {
        &mut self.multisig
    }

    pub fn votes(&self) -> &VoteLedger {
        &self.votes
    }

    /// Records a finality vote from `validator`.
    ///
    /// The voter must be part of the frozen participant snapshot and the
    /// claimed index must match its captured position, so a rotated live set
    /// cannot smuggle votes into someone else's slot.
    pub fn add_finality_vote(
        &mut self,
        validator: &AccountAddress,
        claimed_idx: i64,
        value: bool,
    ) -> Result<(), VoteError> {
        let len = self.participants.len();
        let idx = self
            .participants
            .index_of(validator)
            .ok_or(VoteError::UnknownValidator(*validator))?;

        if claimed_idx < 0 || claimed_idx >= len as i64 {
            return Err(VoteError::IndexOutOfRange {
                idx: claimed_idx,
                len,
            });
        }
        if claimed_idx as u32 != idx {
            return Err(VoteError::IndexMismatch(Mismatch {
                expected: idx,
                got: claimed_idx as u32,
            }));
        }

        self.votes.add_vote(idx, value)
    }

    /// Whether the yes tally has reached the settlement quorum.
    pub fn has_quorum(&self) -> bool {
        self.votes.has_quorum()
    }
}

/// Custody state machine for one external-chain address.
///
/// The committed side (`current_balance`, `current_output`) only moves when a
/// process settles and the follow-up broadcast is reported back; everything
/// in flight lives in [`ProcessState`].
#[derive(
    Clone, Debug, Eq, PartialEq, Arbitrary, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Tracker {
    name: TrackerName,

    state: TrackerState,

    /// Present iff a process instance exists (`Processing` or `Released`
    /// awaiting recycle).
    process: Option<ProcessState>,

    /// Committed custody balance.
    current_balance: SatAmount,

    /// The last committed custody output. The next lock/redeem must spend
    /// exactly this output; `None` until the first lock settles.
    current_output: Option<OutputRef>,
}

impl Tracker {
    /// Creates a fresh tracker with no custody history.
    pub fn new(name: TrackerName) -> Self {
        Self {
            name,
            state: TrackerState::Available,
            process: None,
            current_balance: SatAmount::ZERO,
            current_output: None,
        }
    }

    pub fn name(&self) -> &TrackerName {
        &self.name
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn current_balance(&self) -> SatAmount {
        self.current_balance
    }

    pub fn current_output(&self) -> Option<&OutputRef> {
        self.current_output.as_ref()
    }

    pub fn process(&self) -> Option<&ProcessState> {
        self.process.as_ref()
    }

    pub fn process_mut(&mut self) -> Option<&mut ProcessState> {
        self.process.as_mut()
    }

    /// Whether a new lock/redeem may reserve this tracker.
    pub fn is_available(&self) -> bool {
        self.state == TrackerState::Available
    }

    /// Whether the current process instance has already settled.
    pub fn is_finalized(&self) -> bool {
        self.state == TrackerState::Released
    }

    /// Checks a lock transaction against the custody-chain invariant.
    ///
    /// A single-input transaction is the initial lock for this custody chain
    /// and must carry the whole resulting custody value in its first output.
    /// Every other transaction must spend exactly the tracker's current
    /// custody output.
    pub fn validate_lock_tx(
        &self,
        tx: &Transaction,
        lock_amount: SatAmount,
    ) -> Result<(), TrackerError> {
        let first_input = tx.input.first().ok_or(TrackerError::MissingInputs)?;
        let is_first_txn = tx.input.len() == 1;

        if is_first_txn {
            let out = tx.output.first().ok_or(TrackerError::MissingOutputs)?;
            let expected = lock_amount
                .checked_add(self.current_balance)
                .ok_or(TrackerError::BalanceOverflow)?;
            if out.value.to_sat() != expected.to_sat() {
                return Err(TrackerError::FirstLockValueMismatch(Mismatch {
                    expected: expected.to_sat(),
                    got: out.value.to_sat(),
                }));
            }
        } else {
            self.check_spends_custody_output(first_input)?;
        }

        Ok(())
    }

    /// Checks a redeem transaction against the custody-chain invariant and
    /// the committed balance.
    pub fn validate_redeem_tx(
        &self,
        tx: &Transaction,
        redeem_amount: SatAmount,
    ) -> Result<(), TrackerError> {
        let first_input = tx.input.first().ok_or(TrackerError::MissingInputs)?;
        self.check_spends_custody_output(first_input)?;

        if redeem_amount > self.current_balance {
            return Err(TrackerError::BalanceUnderflow {
                balance: self.current_balance,
                amount: redeem_amount,
            });
        }

        Ok(())
    }

    fn check_spends_custody_output(&self, input: &bitcoin::TxIn) -> Result<(), TrackerError> {
        let expected = self.current_output.ok_or(TrackerError::NoCustodyOutput)?;
        let got = OutputRef::from(input.previous_output);
        if got != expected {
            return Err(TrackerError::SpentOutputMismatch(Mismatch {
                expected,
                got,
            }));
        }
        Ok(())
    }

    /// Reserves the tracker for a lock process.
    pub fn begin_lock(
        &mut self,
        owner: AccountAddress,
        raw_tx: RawExternalTx,
        lock_amount: SatAmount,
        participants: ParticipantTable,
    ) -> Result<(), TrackerError> {
        let pending = self
            .current_balance
            .checked_add(lock_amount)
            .ok_or(TrackerError::BalanceOverflow)?;
        self.begin_process(ProcessKind::Lock, owner, raw_tx, pending, participants)
    }

    /// Reserves the tracker for a redeem process.
    pub fn begin_redeem(
        &mut self,
        owner: AccountAddress,
        raw_tx: RawExternalTx,
        redeem_amount: SatAmount,
        participants: ParticipantTable,
    ) -> Result<(), TrackerError> {
        let pending = self
            .current_balance
            .checked_sub(redeem_amount)
            .ok_or(TrackerError::BalanceUnderflow {
                balance: self.current_balance,
                amount: redeem_amount,
            })?;
        self.begin_process(ProcessKind::Redeem, owner, raw_tx, pending, participants)
    }

    fn begin_process(
        &mut self,
        kind: ProcessKind,
        owner: AccountAddress,
        raw_tx: RawExternalTx,
        pending: SatAmount,
        participants: ParticipantTable,
    ) -> Result<(), TrackerError> {
        if !self.is_available() {
            return Err(TrackerError::NotAvailable);
        }

        let n = participants.len();
        let threshold = participants.threshold();
        self.process = Some(ProcessState {
            kind,
            owner,
            balance: pending,
            raw_tx,
            participants,
            multisig: MultisigAssembler::new(n, threshold),
            votes: VoteLedger::new(n, threshold),
        });
        self.state = TrackerState::Processing;
        Ok(())
    }

    /// Transitions `Processing -> Released` once the vote quorum settled.
    ///
    /// Callers must have applied the balance effect in the same commit; this
    /// only moves the state machine.
    pub fn mark_released(&mut self) -> Result<(), TrackerError> {
        if self.state != TrackerState::Processing {
            return Err(TrackerError::InvalidState(self.state));
        }
        if self.process.is_none() {
            return Err(TrackerError::NoProcess);
        }
        self.state = TrackerState::Released;
        Ok(())
    }

    /// Commits the settled process and recycles the tracker for the next one.
    ///
    /// Called when the broadcast of the fully signed external transaction is
    /// reported back: the pending balance becomes committed and the broadcast
    /// txid becomes the new custody-chain tip.
    pub fn recycle(&mut self, broadcast_txid: ExternalTxid) -> Result<(), TrackerError> {
        if self.state != TrackerState::Released {
            return Err(TrackerError::InvalidState(self.state));
        }
        let process = self.process.take().ok_or(TrackerError::NoProcess)?;
        self.current_balance = process.balance();
        self.current_output = Some(OutputRef::new(broadcast_txid, 0));
        self.state = TrackerState::Available;
        Ok(())
    }
}
