//! Low level tracker store interface.

use pegbridge_tracker_types::{Tracker, TrackerName};

use crate::DbResult;

/// Keyed persistence for [`Tracker`]s.
///
/// Operations are NOT VALIDATED at this level; handlers enforce the tracker
/// invariants before writing.
pub trait TrackerDatabase: Send + Sync + 'static {
    /// Gets a tracker by name, if present.
    fn get_tracker(&self, name: &TrackerName) -> DbResult<Option<Tracker>>;

    /// Atomically replaces the stored tracker under its name.
    fn put_tracker(&self, tracker: Tracker) -> DbResult<()>;
}
