//! Lock transaction handler.

use bitcoin::Transaction;
use pegbridge_tracker_types::{ParticipantTable, Tracker};
use pegbridge_txs::{
    decode_payload, validate_basic, validate_fee, Lock, Payload, RawTx, Response, SignedTx,
    TxError, TxType,
};
use tracing::debug;

use crate::{context::HandlerContext, fees::basic_fee_handling, registry::TxHandler};

/// Fee multiplier for lock transactions.
const LOCK_FEE_MULTIPLIER: u64 = 1;

pub struct LockHandler;

/// Loads the named tracker, creating a fresh one for an unknown name.
///
/// Trackers come into existence implicitly with the first lock that
/// references them.
fn load_or_create_tracker(ctx: &HandlerContext, lock: &Lock) -> Result<Tracker, TxError> {
    Ok(ctx
        .trackers()
        .get_tracker(&lock.tracker_name)?
        .unwrap_or_else(|| Tracker::new(lock.tracker_name.clone())))
}

/// The mutation both check and deliver funnel through. Returns the mutated
/// tracker; only deliver persists it.
fn run_lock(ctx: &HandlerContext, lock: &Lock) -> Result<(Tracker, Response), TxError> {
    let mut tracker = load_or_create_tracker(ctx, lock)?;
    if !tracker.is_available() {
        return Err(TxError::TrackerUnavailable(lock.tracker_name.clone()));
    }

    // Capture the validator snapshot; quorum is computed once here and never
    // recomputed for this process instance.
    let participants = ParticipantTable::from_entries(ctx.validators().current_set())?;
    debug!(
        tracker = %lock.tracker_name,
        participants = participants.len(),
        threshold = participants.threshold(),
        "reserving tracker for lock"
    );

    tracker.begin_lock(
        lock.locker,
        lock.external_tx.clone(),
        lock.lock_amount,
        participants,
    )?;

    let response = Response {
        log: format!("tracker {} reserved for lock", lock.tracker_name),
        info: format!("pending balance: {}", tracker.process().expect("just reserved").balance()),
        ..Default::default()
    }
    .tagged(lock.tags());
    Ok((tracker, response))
}

impl TxHandler for LockHandler {
    fn tx_type(&self) -> TxType {
        TxType::Lock
    }

    fn validate(&self, ctx: &HandlerContext, stx: &SignedTx) -> Result<(), TxError> {
        let lock: Lock = decode_payload(&stx.raw.payload)?;
        validate_basic(&stx.raw.raw_bytes(), &lock.signers(), &stx.signatures)?;
        validate_fee(&ctx.min_fee()?, &stx.raw.fee)?;

        let tracker = load_or_create_tracker(ctx, &lock)?;
        if !tracker.is_available() {
            return Err(TxError::TrackerUnavailable(lock.tracker_name.clone()));
        }

        let tx: Transaction = (&lock.external_tx)
            .try_into()
            .map_err(|_| TxError::MissingData("malformed external transaction".to_owned()))?;
        tracker.validate_lock_tx(&tx, lock.lock_amount)?;

        Ok(())
    }

    fn process_check(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let lock: Lock = decode_payload(&tx.payload)?;
        // Check never commits; the mutated tracker is dropped.
        let (_, response) = run_lock(ctx, &lock)?;
        Ok(response)
    }

    fn process_deliver(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let lock: Lock = decode_payload(&tx.payload)?;
        let (tracker, response) = run_lock(ctx, &lock)?;
        ctx.trackers().put_tracker(tracker)?;
        Ok(response)
    }

    fn process_fee(
        &self,
        ctx: &HandlerContext,
        stx: &SignedTx,
        size: u64,
    ) -> Result<Response, TxError> {
        basic_fee_handling(ctx, stx, size, LOCK_FEE_MULTIPLIER)
    }
}
