//! Broadcast job behavior: success reporting, bounded retries, stale aborts.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::{
    absolute::LockTime, transaction::Version, Amount, OutPoint, ScriptBuf, Sequence, Transaction,
    TxIn, TxOut, Witness,
};
use parking_lot::Mutex;
use pegbridge_broadcaster::{
    attach_script_to_first_input, decode_external_tx, BroadcastContext, BroadcastError,
    BroadcastJob, ChainDriver, InternalBroadcaster, JobStatus, LockScriptProvider,
};
use pegbridge_db::{stub::StubTrackerDb, TrackerDatabase};
use pegbridge_params::BroadcastParams;
use pegbridge_primitives::prelude::*;
use pegbridge_test_utils::ArbitraryGenerator;
use pegbridge_tracker_types::{ParticipantEntry, ParticipantTable, Tracker, TrackerName};
use pegbridge_txs::{decode_payload, BroadcastSuccess, RawTx, TxType};

/// Driver that fails the first `fail_first` broadcast attempts.
struct MockDriver {
    fail_first: u32,
    broadcast_calls: AtomicU32,
    txid: ExternalTxid,
}

impl MockDriver {
    fn new(fail_first: u32) -> Self {
        Self {
            fail_first,
            broadcast_calls: AtomicU32::new(0),
            txid: ExternalTxid::from(Buf32::new([0xcc; 32])),
        }
    }

    fn calls(&self) -> u32 {
        self.broadcast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainDriver for MockDriver {
    fn decode_tx(&self, raw: &RawExternalTx) -> Result<Transaction, BroadcastError> {
        decode_external_tx(raw)
    }

    fn attach_spend_script(
        &self,
        raw: &RawExternalTx,
        script: ScriptBuf,
    ) -> Result<Transaction, BroadcastError> {
        attach_script_to_first_input(raw, script)
    }

    async fn broadcast(&self, _tx: &Transaction) -> Result<ExternalTxid, BroadcastError> {
        let call = self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(BroadcastError::Chain("external node unreachable".to_owned()));
        }
        Ok(self.txid)
    }
}

struct FixedLockScripts;

impl LockScriptProvider for FixedLockScripts {
    fn lock_script(&self, _tracker: &TrackerName) -> Option<Vec<u8>> {
        Some(vec![0x52, 0x21, 0x03, 0xae])
    }
}

#[derive(Default)]
struct RecordingInternal {
    submitted: Mutex<Vec<RawTx>>,
}

#[async_trait]
impl InternalBroadcaster for RecordingInternal {
    async fn submit(&self, tx: RawTx) -> Result<(), BroadcastError> {
        self.submitted.lock().push(tx);
        Ok(())
    }
}

fn participants(n: usize) -> ParticipantTable {
    let mut gen = ArbitraryGenerator::new();
    let entries: Vec<ParticipantEntry> = (0..n).map(|_| gen.generate()).collect();
    ParticipantTable::from_entries(entries).unwrap()
}

/// Builds a processing tracker holding `n_sigs` collected signatures, stores
/// it, and returns the pending txid the job should capture.
fn seed_tracker(db: &StubTrackerDb, name: &str, n_sigs: u32) -> ExternalTxid {
    let mut gen = ArbitraryGenerator::new();
    let pending_tx = Transaction {
        version: Version::ONE,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: gen.generate::<ExternalTxid>().into(),
                vout: 0,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![TxOut {
            value: Amount::from_sat(100),
            script_pubkey: ScriptBuf::new(),
        }],
    };
    let expected: ExternalTxid = pending_tx.compute_txid().into();

    let mut tracker = Tracker::new(TrackerName::from(name));
    tracker
        .begin_lock(
            gen.generate(),
            pending_tx.into(),
            SatAmount::from_sat(100),
            participants(4),
        )
        .unwrap();
    let multisig = tracker.process_mut().unwrap().multisig_mut();
    for i in 0..n_sigs {
        multisig
            .add_signature(i, vec![0x30 + i as u8; 71])
            .unwrap();
    }
    db.put_tracker(tracker).unwrap();
    expected
}

fn context(db: Arc<StubTrackerDb>, driver: Arc<MockDriver>, internal: Arc<RecordingInternal>) -> BroadcastContext {
    BroadcastContext {
        trackers: db,
        driver,
        lock_scripts: Arc::new(FixedLockScripts),
        internal,
        params: BroadcastParams {
            max_retries: 3,
            retry_delay_ms: 1,
        },
        reporter: AccountAddress::new([0x0a; 20]),
    }
}

#[tokio::test]
async fn test_broadcast_success_reports_internal_tx() {
    let db = Arc::new(StubTrackerDb::new());
    let expected = seed_tracker(&db, "t0", 3);
    let driver = Arc::new(MockDriver::new(0));
    let internal = Arc::new(RecordingInternal::default());
    let ctx = context(db, driver.clone(), internal.clone());

    let mut job = BroadcastJob::new("job-1", TrackerName::from("t0"), expected);
    job.run(&ctx).await.unwrap();

    assert_eq!(job.status(), JobStatus::Completed);
    assert!(job.is_done());
    assert_eq!(driver.calls(), 1);

    let submitted = internal.submitted.lock();
    assert_eq!(submitted.len(), 1);
    let raw = &submitted[0];
    assert_eq!(raw.tx_type, TxType::BroadcastSuccess);
    assert_eq!(raw.memo, "job-1");
    let report: BroadcastSuccess = decode_payload(&raw.payload).unwrap();
    assert_eq!(report.tracker_name, TrackerName::from("t0"));
    assert_eq!(report.external_txid, ExternalTxid::from(Buf32::new([0xcc; 32])));
}

#[tokio::test]
async fn test_broadcast_retries_transient_failures() {
    let db = Arc::new(StubTrackerDb::new());
    let expected = seed_tracker(&db, "t1", 3);
    let driver = Arc::new(MockDriver::new(2));
    let internal = Arc::new(RecordingInternal::default());
    let ctx = context(db, driver.clone(), internal.clone());

    let mut job = BroadcastJob::new("job-2", TrackerName::from("t1"), expected);
    job.run(&ctx).await.unwrap();

    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(driver.calls(), 3);
    assert_eq!(internal.submitted.lock().len(), 1);
}

#[tokio::test]
async fn test_broadcast_fails_terminally_after_retry_ceiling() {
    let db = Arc::new(StubTrackerDb::new());
    let expected = seed_tracker(&db, "t2", 3);
    let driver = Arc::new(MockDriver::new(u32::MAX));
    let internal = Arc::new(RecordingInternal::default());
    let ctx = context(db, driver.clone(), internal.clone());

    let mut job = BroadcastJob::new("job-3", TrackerName::from("t2"), expected);
    let err = job.run(&ctx).await.unwrap_err();

    assert!(matches!(err, BroadcastError::Chain(_)));
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(driver.calls(), 3);
    assert!(internal.submitted.lock().is_empty());
}

#[tokio::test]
async fn test_broadcast_aborts_on_recycled_tracker() {
    let db = Arc::new(StubTrackerDb::new());
    let expected = seed_tracker(&db, "t3", 3);

    // The tracker settles and recycles before the job runs.
    let mut tracker = db.get_tracker(&TrackerName::from("t3")).unwrap().unwrap();
    tracker.mark_released().unwrap();
    tracker
        .recycle(ExternalTxid::from(Buf32::new([0x01; 32])))
        .unwrap();
    db.put_tracker(tracker).unwrap();

    let driver = Arc::new(MockDriver::new(0));
    let internal = Arc::new(RecordingInternal::default());
    let ctx = context(db, driver.clone(), internal.clone());

    let mut job = BroadcastJob::new("job-4", TrackerName::from("t3"), expected);
    let err = job.run(&ctx).await.unwrap_err();

    // Stale state aborts immediately: no broadcast, no retries.
    assert!(matches!(err, BroadcastError::Stale(_)));
    assert_eq!(job.status(), JobStatus::Aborted);
    assert_eq!(driver.calls(), 0);
    assert!(internal.submitted.lock().is_empty());
}

#[tokio::test]
async fn test_broadcast_aborts_when_new_process_replaced_pending_tx() {
    let db = Arc::new(StubTrackerDb::new());
    let stale_expected = seed_tracker(&db, "t4", 3);

    // A different process instance now owns the tracker: same name, new
    // pending transaction.
    let fresh_expected = seed_tracker(&db, "t4", 3);
    assert_ne!(stale_expected, fresh_expected);

    let driver = Arc::new(MockDriver::new(0));
    let internal = Arc::new(RecordingInternal::default());
    let ctx = context(db, driver.clone(), internal.clone());

    let mut job = BroadcastJob::new("job-5", TrackerName::from("t4"), stale_expected);
    let err = job.run(&ctx).await.unwrap_err();
    assert!(matches!(err, BroadcastError::Stale(_)));
    assert_eq!(driver.calls(), 0);
}

#[tokio::test]
async fn test_broadcast_waits_for_signature_quorum() {
    let db = Arc::new(StubTrackerDb::new());
    // Only 2 of the 3 required signatures collected.
    let expected = seed_tracker(&db, "t5", 2);
    let driver = Arc::new(MockDriver::new(0));
    let internal = Arc::new(RecordingInternal::default());
    let ctx = context(db, driver.clone(), internal.clone());

    let mut job = BroadcastJob::new("job-6", TrackerName::from("t5"), expected);
    let err = job.run(&ctx).await.unwrap_err();

    // Missing signatures are transient; the job retries, then surfaces.
    assert!(matches!(err, BroadcastError::Multisig(_)));
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(driver.calls(), 0);
}
