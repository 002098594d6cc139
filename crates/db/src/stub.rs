//! In-memory tracker store stub for tests and local tooling.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use pegbridge_tracker_types::{Tracker, TrackerName};

use crate::{DbError, DbResult, TrackerDatabase};

/// Map-backed [`TrackerDatabase`].
///
/// Writes can be made to fail on demand, which the handler tests use to check
/// that a store failure never leaves a half-applied balance effect behind.
#[derive(Debug, Default)]
pub struct StubTrackerDb {
    trackers: RwLock<BTreeMap<TrackerName, Tracker>>,
    fail_writes: AtomicBool,
}

impl StubTrackerDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put_tracker` fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl TrackerDatabase for StubTrackerDb {
    fn get_tracker(&self, name: &TrackerName) -> DbResult<Option<Tracker>> {
        Ok(self.trackers.read().get(name).cloned())
    }

    fn put_tracker(&self, tracker: Tracker) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::WriteFailed("injected write failure".to_owned()));
        }
        self.trackers
            .write()
            .insert(tracker.name().clone(), tracker);
        Ok(())
    }
}
