//! Redeem transaction handler.
//!
//! The pegged-balance debit happens here at deliver time; settlement at
//! finality only releases the custody bookkeeping (see `executor`).

use bitcoin::Transaction;
use pegbridge_tracker_types::{ParticipantTable, Tracker};
use pegbridge_txs::{
    decode_payload, validate_basic, validate_fee, Payload, RawTx, Redeem, Response, SignedTx,
    TxError, TxType,
};
use tracing::debug;

use crate::{context::HandlerContext, fees::basic_fee_handling, registry::TxHandler};

/// Fee multiplier for redeem transactions.
const REDEEM_FEE_MULTIPLIER: u64 = 1;

pub struct RedeemHandler;

/// Loads the named tracker; redeems never create trackers implicitly.
fn load_tracker(ctx: &HandlerContext, redeem: &Redeem) -> Result<Tracker, TxError> {
    ctx.trackers()
        .get_tracker(&redeem.tracker_name)?
        .ok_or_else(|| TxError::TrackerUnavailable(redeem.tracker_name.clone()))
}

/// The mutation both check and deliver funnel through. Returns the mutated
/// tracker; only deliver persists it.
fn run_redeem(ctx: &HandlerContext, redeem: &Redeem) -> Result<(Tracker, Response), TxError> {
    let mut tracker = load_tracker(ctx, redeem)?;
    if !tracker.is_available() {
        return Err(TxError::TrackerUnavailable(redeem.tracker_name.clone()));
    }

    let participants = ParticipantTable::from_entries(ctx.validators().current_set())?;
    debug!(
        tracker = %redeem.tracker_name,
        participants = participants.len(),
        threshold = participants.threshold(),
        "reserving tracker for redeem"
    );

    tracker.begin_redeem(
        redeem.redeemer,
        redeem.external_tx.clone(),
        redeem.redeem_amount,
        participants,
    )?;

    let response = Response {
        log: format!("tracker {} reserved for redeem", redeem.tracker_name),
        info: format!(
            "pending balance: {}",
            tracker.process().expect("just reserved").balance()
        ),
        ..Default::default()
    }
    .tagged(redeem.tags());
    Ok((tracker, response))
}

impl TxHandler for RedeemHandler {
    fn tx_type(&self) -> TxType {
        TxType::Redeem
    }

    fn validate(&self, ctx: &HandlerContext, stx: &SignedTx) -> Result<(), TxError> {
        let redeem: Redeem = decode_payload(&stx.raw.payload)?;
        validate_basic(&stx.raw.raw_bytes(), &redeem.signers(), &stx.signatures)?;
        validate_fee(&ctx.min_fee()?, &stx.raw.fee)?;

        let tracker = load_tracker(ctx, &redeem)?;
        if !tracker.is_available() {
            return Err(TxError::TrackerUnavailable(redeem.tracker_name.clone()));
        }

        let tx: Transaction = (&redeem.external_tx)
            .try_into()
            .map_err(|_| TxError::MissingData("malformed external transaction".to_owned()))?;
        tracker.validate_redeem_tx(&tx, redeem.redeem_amount)?;

        Ok(())
    }

    fn process_check(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let redeem: Redeem = decode_payload(&tx.payload)?;
        let (_, response) = run_redeem(ctx, &redeem)?;
        // Confirm the debit is expressible without applying it.
        ctx.asset_currency()?.coin_from_sat(redeem.redeem_amount)?;
        Ok(response)
    }

    fn process_deliver(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let redeem: Redeem = decode_payload(&tx.payload)?;
        let (tracker, response) = run_redeem(ctx, &redeem)?;

        // The net pegged-balance debit happens now, at redeem time; the burn
        // at finality only finalizes custody release.
        let coin = ctx.asset_currency()?.coin_from_sat(redeem.redeem_amount)?;
        ctx.balances().sub_from_address(&redeem.redeemer, &coin)?;

        if let Err(e) = ctx.trackers().put_tracker(tracker) {
            // Re-crediting what was just debited cannot fail.
            ctx.balances()
                .add_to_address(&redeem.redeemer, &coin)
                .expect("re-credit of a just-debited amount cannot fail");
            return Err(e.into());
        }
        Ok(response)
    }

    fn process_fee(
        &self,
        ctx: &HandlerContext,
        stx: &SignedTx,
        size: u64,
    ) -> Result<Response, TxError> {
        basic_fee_handling(ctx, stx, size, REDEEM_FEE_MULTIPLIER)
    }
}
