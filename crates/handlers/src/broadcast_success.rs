//! Broadcast-success (internal bookkeeping) transaction handler.

use pegbridge_tracker_types::Tracker;
use pegbridge_txs::{
    decode_payload, validate_basic, BroadcastSuccess, Payload, RawTx, Response, SignedTx, TxError,
    TxType,
};
use tracing::info;

use crate::{context::HandlerContext, registry::TxHandler};

pub struct BroadcastSuccessHandler;

/// The mutation both check and deliver funnel through: commit the broadcast
/// txid as the new custody-chain tip and recycle the tracker.
fn run_broadcast_success(
    ctx: &HandlerContext,
    report: &BroadcastSuccess,
) -> Result<(Tracker, Response), TxError> {
    let mut tracker = ctx
        .trackers()
        .get_tracker(&report.tracker_name)?
        .ok_or_else(|| TxError::TrackerUnavailable(report.tracker_name.clone()))?;

    tracker.recycle(report.external_txid)?;

    let response = Response {
        log: format!(
            "tracker {} recycled after broadcast {}",
            report.tracker_name, report.external_txid
        ),
        ..Default::default()
    }
    .tagged(report.tags());
    Ok((tracker, response))
}

impl TxHandler for BroadcastSuccessHandler {
    fn tx_type(&self) -> TxType {
        TxType::BroadcastSuccess
    }

    fn validate(&self, _ctx: &HandlerContext, stx: &SignedTx) -> Result<(), TxError> {
        let report: BroadcastSuccess = decode_payload(&stx.raw.payload)?;
        validate_basic(&stx.raw.raw_bytes(), &report.signers(), &stx.signatures)?;
        Ok(())
    }

    fn process_check(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let report: BroadcastSuccess = decode_payload(&tx.payload)?;
        let (_, response) = run_broadcast_success(ctx, &report)?;
        Ok(response)
    }

    fn process_deliver(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let report: BroadcastSuccess = decode_payload(&tx.payload)?;
        let (tracker, response) = run_broadcast_success(ctx, &report)?;
        ctx.trackers().put_tracker(tracker)?;
        info!(tracker = %report.tracker_name, txid = %report.external_txid, "custody chain advanced");
        Ok(response)
    }

    fn process_fee(
        &self,
        _ctx: &HandlerContext,
        _stx: &SignedTx,
        _size: u64,
    ) -> Result<Response, TxError> {
        // Internal transaction, fee exempt.
        Ok(Response::default())
    }
}
