//! Per-location readers-writer locks.
//!
//! Every storage location gets its own `RwLock`, handed out as owned guards
//! so a read guard can travel inside a returned byte stream. The map itself
//! is guarded by a plain mutex held only for lookup and sweep, never across
//! an await point.

use depot_core::Location;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

struct LockEntry {
    lock: Arc<RwLock<()>>,
    last_access: Instant,
}

/// A map of per-location locks with idle-entry eviction.
///
/// Sweeping piggybacks on acquisition: each lookup drops entries that have
/// been idle longer than the configured lifetime. An entry whose lock is
/// still referenced outside the map (strong count above one) is never
/// evicted, so a held or pending guard keeps its lock identity stable.
pub struct LocationLocks {
    entries: Mutex<HashMap<Location, LockEntry>>,
    lifetime: Duration,
}

impl LocationLocks {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            lifetime,
        }
    }

    /// Acquire a shared read guard for the location.
    pub async fn read(&self, location: &Location) -> OwnedRwLockReadGuard<()> {
        self.acquire(location).read_owned().await
    }

    /// Acquire an exclusive write guard for the location.
    pub async fn write(&self, location: &Location) -> OwnedRwLockWriteGuard<()> {
        self.acquire(location).write_owned().await
    }

    /// Number of tracked locations. Sweeps first, so the count reflects
    /// live and recently used entries only.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::sweep(&mut entries, now, self.lifetime);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn acquire(&self, location: &Location) -> Arc<RwLock<()>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::sweep(&mut entries, now, self.lifetime);

        let entry = entries.entry(location.clone()).or_insert_with(|| LockEntry {
            lock: Arc::new(RwLock::new(())),
            last_access: now,
        });
        entry.last_access = now;
        entry.lock.clone()
    }

    fn sweep(entries: &mut HashMap<Location, LockEntry>, now: Instant, lifetime: Duration) {
        entries.retain(|_, entry| {
            Arc::strong_count(&entry.lock) > 1 || now.duration_since(entry.last_access) < lifetime
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[tokio::test]
    async fn write_guard_excludes_readers() {
        let locks = Arc::new(LocationLocks::new(Duration::from_secs(60)));
        let target = location("a/b/file.jar");

        let write = locks.write(&target).await;

        let locks_clone = locks.clone();
        let target_clone = target.clone();
        let reader = tokio::spawn(async move {
            let _read = locks_clone.read(&target_clone).await;
        });

        // The reader cannot proceed while the write guard is held.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!reader.is_finished());

        drop(write);
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn distinct_locations_do_not_contend() {
        let locks = LocationLocks::new(Duration::from_secs(60));
        let _a = locks.write(&location("a/file.jar")).await;
        // Acquiring a different location must not block.
        let _b = locks.write(&location("b/file.jar")).await;
    }

    #[tokio::test]
    async fn idle_entries_are_swept() {
        let locks = LocationLocks::new(Duration::from_millis(10));
        drop(locks.read(&location("a/file.jar")).await);
        assert_eq!(locks.len(), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn held_guard_survives_sweep() {
        let locks = LocationLocks::new(Duration::from_millis(10));
        let target = location("a/file.jar");
        let guard = locks.read(&target).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        // Entry retained: its lock is still referenced by the guard.
        assert_eq!(locks.len(), 1);

        // The held lock keeps its identity, so a writer still waits on it.
        let locks = Arc::new(locks);
        let locks_clone = locks.clone();
        let target_clone = target.clone();
        let writer = tokio::spawn(async move {
            let _write = locks_clone.write(&target_clone).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!writer.is_finished());

        drop(guard);
        writer.await.unwrap();
    }
}
