//! The retryable broadcast job.

use std::sync::Arc;
use std::time::Duration;

use pegbridge_db::TrackerDatabase;
use pegbridge_ledger_types::{Coin, LedgerAmount};
use pegbridge_params::BroadcastParams;
use pegbridge_primitives::prelude::*;
use pegbridge_tracker_types::TrackerName;
use pegbridge_txs::{encode_payload, BroadcastSuccess, Fee, Payload, RawTx};
use tracing::{error, info, warn};

use crate::{
    driver::{assemble_spend_script, ChainDriver, InternalBroadcaster, LockScriptProvider},
    errors::BroadcastError,
};

/// Shared context for broadcast jobs.
pub struct BroadcastContext {
    pub trackers: Arc<dyn TrackerDatabase>,
    pub driver: Arc<dyn ChainDriver>,
    pub lock_scripts: Arc<dyn LockScriptProvider>,
    pub internal: Arc<dyn InternalBroadcaster>,
    pub params: BroadcastParams,

    /// Validator identity under which completion reports are submitted.
    pub reporter: AccountAddress,
}

/// Lifecycle of one broadcast job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
    New,
    InProgress,
    Completed,

    /// The tracker no longer matches the captured state; broadcasting was
    /// aborted rather than retried blindly.
    Aborted,

    /// The retry ceiling was exceeded; surfaced for operator attention.
    Failed,
}

/// One attempt to push a tracker's fully-signed custody transaction to the
/// external chain.
///
/// The job captures the pending transaction's txid at creation; before any
/// broadcast it reloads the tracker and verifies the pending transaction is
/// still the one it was created for.
#[derive(Debug)]
pub struct BroadcastJob {
    job_id: String,
    tracker_name: TrackerName,
    expected_txid: ExternalTxid,
    status: JobStatus,
}

impl BroadcastJob {
    pub fn new(job_id: impl Into<String>, tracker_name: TrackerName, expected_txid: ExternalTxid) -> Self {
        Self {
            job_id: job_id.into(),
            tracker_name,
            expected_txid,
            status: JobStatus::New,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Runs the job to completion, retrying transient failures up to the
    /// configured ceiling.
    pub async fn run(&mut self, ctx: &BroadcastContext) -> Result<(), BroadcastError> {
        self.status = JobStatus::InProgress;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match self.try_broadcast(ctx).await {
                Ok(txid) => {
                    self.report_success(ctx, txid).await?;
                    self.status = JobStatus::Completed;
                    info!(job = %self.job_id, tracker = %self.tracker_name, %txid, "broadcast complete");
                    return Ok(());
                }
                Err(BroadcastError::Stale(reason)) => {
                    self.status = JobStatus::Aborted;
                    warn!(job = %self.job_id, tracker = %self.tracker_name, %reason, "broadcast aborted on stale tracker");
                    return Err(BroadcastError::Stale(reason));
                }
                Err(e) if attempt >= ctx.params.max_retries => {
                    self.status = JobStatus::Failed;
                    error!(
                        job = %self.job_id,
                        tracker = %self.tracker_name,
                        attempts = attempt,
                        err = %e,
                        "broadcast failed terminally"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(job = %self.job_id, tracker = %self.tracker_name, attempt, err = %e, "broadcast attempt failed, retrying");
                    tokio::time::sleep(Duration::from_millis(ctx.params.retry_delay_ms)).await;
                }
            }
        }
    }

    /// One broadcast attempt: freshness check, script assembly, push.
    async fn try_broadcast(&self, ctx: &BroadcastContext) -> Result<ExternalTxid, BroadcastError> {
        let tracker = ctx
            .trackers
            .get_tracker(&self.tracker_name)?
            .ok_or_else(|| BroadcastError::Stale("tracker not found".to_owned()))?;
        let process = tracker
            .process()
            .ok_or_else(|| BroadcastError::Stale("tracker has been recycled".to_owned()))?;

        // Freshness: the pending transaction must still be the one this job
        // was created for.
        let pending = ctx.driver.decode_tx(process.raw_tx())?;
        let pending_txid = ExternalTxid::from(pending.compute_txid());
        if pending_txid != self.expected_txid {
            return Err(BroadcastError::Stale(format!(
                "tracker now carries pending tx {pending_txid}, expected {}",
                self.expected_txid
            )));
        }

        let collected = process.multisig().collected()?;
        let lock_script = ctx
            .lock_scripts
            .lock_script(&self.tracker_name)
            .ok_or_else(|| BroadcastError::MissingLockScript(self.tracker_name.clone()))?;
        let spend_script = assemble_spend_script(&collected, &lock_script)?;

        let finalized = ctx.driver.attach_spend_script(process.raw_tx(), spend_script)?;
        ctx.driver.broadcast(&finalized).await
    }

    /// Reports the broadcast back into the ledger as an internal
    /// `BroadcastSuccess` transaction.
    async fn report_success(
        &self,
        ctx: &BroadcastContext,
        txid: ExternalTxid,
    ) -> Result<(), BroadcastError> {
        let report = BroadcastSuccess {
            tracker_name: self.tracker_name.clone(),
            reporter: ctx.reporter,
            external_txid: txid,
        };
        // Internal transactions are fee exempt; the node's pipeline signs
        // them on re-injection.
        let raw = RawTx {
            tx_type: BroadcastSuccess::TX_TYPE,
            payload: encode_payload(&report),
            fee: Fee {
                price: Coin::new("", LedgerAmount::ZERO),
                gas: 0,
            },
            memo: self.job_id.clone(),
        };
        ctx.internal.submit(raw).await
    }
}
