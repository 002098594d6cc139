//! Mint/burn settlement executor.
//!
//! Settlement happens exactly once per process instance, inside the finality
//! handler's deliver stage. The balance effects and the `Released` tracker
//! write commit together or not at all: a store failure after the ledger was
//! touched reverses the ledger before the error propagates, leaving the
//! tracker `Processing` so finality votes can be replayed.

use bitcoin::Transaction;
use pegbridge_ledger_types::Coin;
use pegbridge_primitives::prelude::*;
use pegbridge_tracker_types::{ProcessKind, Tracker};
use pegbridge_txs::{ReportFinality, TxError};
use tracing::{error, info};

use crate::context::HandlerContext;

/// Balance effects of settling one process, applied as a unit.
pub(crate) struct SettlePlan {
    credits: Vec<(AccountAddress, Coin)>,
    debits: Vec<(AccountAddress, Coin)>,
}

/// Computes the balance effects of settlement without applying anything.
///
/// For a lock this is the mint: the locked amount parsed from the signed
/// external transaction, credited to the locker and mirrored into the supply
/// account. For a redeem this is the burn: the supply account gives back the
/// amount the redeemer was already debited at redeem time.
pub(crate) fn plan_settlement(
    ctx: &HandlerContext,
    tracker: &Tracker,
    report: &ReportFinality,
) -> Result<SettlePlan, TxError> {
    let process = tracker
        .process()
        .ok_or_else(|| TxError::TrackerUnavailable(tracker.name().clone()))?;
    let currency = ctx.asset_currency()?;

    match process.kind() {
        ProcessKind::Lock => {
            let locked = parse_locked_amount(tracker)?;
            let coin = currency.coin_from_sat(locked)?;
            Ok(SettlePlan {
                credits: vec![
                    (report.locker, coin.clone()),
                    (*ctx.supply_account(), coin),
                ],
                debits: Vec::new(),
            })
        }
        ProcessKind::Redeem => {
            let redeemed = tracker
                .current_balance()
                .checked_sub(process.balance())
                .ok_or_else(|| {
                    TxError::MissingData("pending balance exceeds custody balance".to_owned())
                })?;
            let coin = currency.coin_from_sat(redeemed)?;
            Ok(SettlePlan {
                credits: Vec::new(),
                debits: vec![(*ctx.supply_account(), coin)],
            })
        }
    }
}

/// Parses the locked amount out of the tracker's signed external transaction:
/// the cumulative custody output minus the previously committed balance.
fn parse_locked_amount(tracker: &Tracker) -> Result<SatAmount, TxError> {
    let process = tracker
        .process()
        .ok_or_else(|| TxError::TrackerUnavailable(tracker.name().clone()))?;
    let tx: Transaction = process
        .raw_tx()
        .try_into()
        .map_err(|_| TxError::MissingData("malformed external transaction".to_owned()))?;
    let custody_out = tx
        .output
        .first()
        .ok_or_else(|| TxError::MissingData("external transaction has no outputs".to_owned()))?;

    SatAmount::from(custody_out.value)
        .checked_sub(tracker.current_balance())
        .ok_or_else(|| {
            TxError::MissingData("custody output below committed balance".to_owned())
        })
}

/// Settles the process: applies the balance effects and commits the
/// `Released` tracker as a single unit.
pub(crate) fn settle(
    ctx: &HandlerContext,
    tracker: &mut Tracker,
    report: &ReportFinality,
) -> Result<(), TxError> {
    let plan = plan_settlement(ctx, tracker, report)?;
    let kind = tracker.process().expect("plan required a process").kind();

    tracker.mark_released()?;
    apply_settlement(ctx, &plan)?;

    if let Err(e) = ctx.trackers().put_tracker(tracker.clone()) {
        error!(tracker = %tracker.name(), err = %e, "tracker write failed after settlement, reverting ledger");
        revert_settlement(ctx, &plan);
        return Err(e.into());
    }

    info!(tracker = %tracker.name(), kind = kind.as_str(), "custody process settled");
    Ok(())
}

/// Applies the plan, rolling back already-applied effects on failure.
fn apply_settlement(ctx: &HandlerContext, plan: &SettlePlan) -> Result<(), TxError> {
    let balances = ctx.balances();

    for (i, (address, coin)) in plan.credits.iter().enumerate() {
        if let Err(e) = balances.add_to_address(address, coin) {
            unwind_credits(ctx, &plan.credits[..i]);
            return Err(e.into());
        }
    }
    for (i, (address, coin)) in plan.debits.iter().enumerate() {
        if let Err(e) = balances.sub_from_address(address, coin) {
            unwind_debits(ctx, &plan.debits[..i]);
            unwind_credits(ctx, &plan.credits);
            return Err(e.into());
        }
    }
    Ok(())
}

/// Reverses a fully applied plan.
fn revert_settlement(ctx: &HandlerContext, plan: &SettlePlan) {
    unwind_debits(ctx, &plan.debits);
    unwind_credits(ctx, &plan.credits);
}

fn unwind_credits(ctx: &HandlerContext, applied: &[(AccountAddress, Coin)]) {
    for (address, coin) in applied {
        // Removing a just-applied credit cannot fail under the pipeline's
        // single-writer model.
        ctx.balances()
            .sub_from_address(address, coin)
            .expect("unwind of a just-applied credit cannot fail");
    }
}

fn unwind_debits(ctx: &HandlerContext, applied: &[(AccountAddress, Coin)]) {
    for (address, coin) in applied {
        ctx.balances()
            .add_to_address(address, coin)
            .expect("unwind of a just-applied debit cannot fail");
    }
}
