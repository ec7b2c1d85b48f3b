//! Small collection of concurrency and collection helpers shared by the
//! rest of the workspace, modeled on `ckb-util`: a thin reexport layer so
//! every crate agrees on the same `RwLock` and hasher without repeating
//! the choice everywhere.

pub use parking_lot::{self, Mutex, RwLock, RwLockReadGuard, RwLockUpgradableReadGuard,
    RwLockWriteGuard};

use rustc_hash::FxHasher;
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;

/// A `HashMap` using the fast, non-DoS-resistant `rustc-hash` algorithm.
/// Appropriate for workspace-internal keys (hashes, numeric ids) that are
/// never attacker-chosen strings.
pub type FnvHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A `HashSet` using the fast, non-DoS-resistant `rustc-hash` algorithm.
pub type FnvHashSet<T> = HashSet<T, BuildHasherDefault<FxHasher>>;

#[cfg(feature = "deadlock_detection")]
pub mod deadlock {
    //! Periodically scans for deadlocked `parking_lot` locks and logs a
    //! diagnostic when one is found. Enabled only in debug builds of the
    //! embedding binary, matching `ckb-util`'s deadlock-detection feature.
    use parking_lot::deadlock;
    use std::thread;
    use std::time::Duration;

    /// Spawn a background thread that checks for deadlocks every `period`.
    pub fn spawn_deadlock_detection_thread(period: Duration) {
        thread::spawn(move || loop {
            thread::sleep(period);
            let deadlocks = deadlock::check_deadlock();
            if deadlocks.is_empty() {
                continue;
            }
            eprintln!("{} deadlocks detected", deadlocks.len());
            for (i, threads) in deadlocks.iter().enumerate() {
                for t in threads {
                    eprintln!("deadlock #{i}: {:#?}", t.thread_id());
                }
            }
        });
    }
}
