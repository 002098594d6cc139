//! Finality-vote transaction handler.

use pegbridge_tracker_types::Tracker;
use pegbridge_txs::{
    decode_payload, validate_basic, Payload, RawTx, ReportFinality, Response, SignedTx, TxError,
    TxType,
};
use tracing::debug;

use crate::{context::HandlerContext, executor, registry::TxHandler};

pub struct FinalityHandler;

/// What one finality vote did to the tracker.
enum VoteResult {
    /// The process already settled; late and duplicate finalizing votes are
    /// absorbed without effect.
    AlreadyFinal,

    /// Vote recorded, quorum not yet reached.
    Recorded(Tracker),

    /// This vote tipped the tally over the threshold.
    Quorum(Tracker),
}

/// The vote bookkeeping both check and deliver funnel through.
fn run_finality(ctx: &HandlerContext, report: &ReportFinality) -> Result<VoteResult, TxError> {
    let mut tracker = ctx
        .trackers()
        .get_tracker(&report.tracker_name)?
        .ok_or_else(|| TxError::TrackerUnavailable(report.tracker_name.clone()))?;

    if tracker.is_finalized() {
        return Ok(VoteResult::AlreadyFinal);
    }

    let process = tracker
        .process_mut()
        .ok_or_else(|| TxError::TrackerUnavailable(report.tracker_name.clone()))?;

    process.add_finality_vote(&report.validator_address, report.vote_index, true)?;
    debug!(
        tracker = %report.tracker_name,
        validator = %report.validator_address,
        yes = process.votes().yes_count(),
        no = process.votes().no_count(),
        "finality vote recorded"
    );

    if process.has_quorum() {
        Ok(VoteResult::Quorum(tracker))
    } else {
        Ok(VoteResult::Recorded(tracker))
    }
}

fn progress_response(tracker: &Tracker, report: &ReportFinality) -> Response {
    let votes = tracker
        .process()
        .expect("vote was just recorded")
        .votes();
    Response::with_log(format!(
        "vote recorded, quorum not reached: yes={} no={}",
        votes.yes_count(),
        votes.no_count()
    ))
    .tagged(report.tags())
}

fn already_final_response(report: &ReportFinality) -> Response {
    Response::with_log("tracker already finalized").tagged(report.tags())
}

impl TxHandler for FinalityHandler {
    fn tx_type(&self) -> TxType {
        TxType::ReportFinality
    }

    fn validate(&self, _ctx: &HandlerContext, stx: &SignedTx) -> Result<(), TxError> {
        let report: ReportFinality = decode_payload(&stx.raw.payload)?;
        validate_basic(&stx.raw.raw_bytes(), &report.signers(), &stx.signatures)?;

        if report.vote_index < 0 {
            return Err(TxError::MissingData("negative vote index".to_owned()));
        }

        Ok(())
    }

    fn process_check(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let report: ReportFinality = decode_payload(&tx.payload)?;
        match run_finality(ctx, &report)? {
            VoteResult::AlreadyFinal => Ok(already_final_response(&report)),
            VoteResult::Recorded(tracker) => Ok(progress_response(&tracker, &report)),
            VoteResult::Quorum(tracker) => {
                // Check never commits: confirm the settlement is expressible,
                // then drop everything.
                executor::plan_settlement(ctx, &tracker, &report)?;
                Ok(Response::with_log("quorum reached").tagged(report.tags()))
            }
        }
    }

    fn process_deliver(&self, ctx: &HandlerContext, tx: &RawTx) -> Result<Response, TxError> {
        let report: ReportFinality = decode_payload(&tx.payload)?;
        match run_finality(ctx, &report)? {
            VoteResult::AlreadyFinal => Ok(already_final_response(&report)),
            VoteResult::Recorded(tracker) => {
                let response = progress_response(&tracker, &report);
                ctx.trackers().put_tracker(tracker)?;
                Ok(response)
            }
            VoteResult::Quorum(mut tracker) => {
                executor::settle(ctx, &mut tracker, &report)?;
                Ok(Response::with_log("settlement successful").tagged(report.tags()))
            }
        }
    }

    fn process_fee(
        &self,
        _ctx: &HandlerContext,
        _stx: &SignedTx,
        _size: u64,
    ) -> Result<Response, TxError> {
        // Validator-internal transaction, fee exempt.
        Ok(Response::default())
    }
}
