//! Concurrency-safe, time-evicted store of session records.
//!
//! Two levels of locking. The outer `std::sync::Mutex` guards only the map
//! structure (insert, lookup, delete, iterate) and is never held across an
//! await. Each record sits behind its own `tokio::sync::Mutex`, so a whole
//! turn can hold the record across the extraction call while other sessions
//! proceed; concurrent turns on the same id serialize on that lock.
//!
//! Expiry is passive. `get` evicts an expired record on access and
//! `create` opportunistically purges the whole map. Expiry checks use
//! `try_lock`: a record whose lock is held is mid-turn and therefore live.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use sahayak_core::SessionStatus;

use crate::error::SessionError;
use crate::record::SessionRecord;

/// Shared handle to one session record.
pub type SessionHandle = Arc<tokio::sync::Mutex<SessionRecord>>;

/// Snapshot counts over the registry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegistryStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
}

/// Keyed store of session records with TTL-based lazy eviction.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionHandle>>,
    timeout: Duration,
}

impl SessionRegistry {
    /// Registry with the given idle timeout in minutes.
    pub fn new(timeout_minutes: i64) -> Self {
        Self::with_timeout(Duration::minutes(timeout_minutes))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn lock_map(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionHandle>>, SessionError> {
        self.sessions
            .lock()
            .map_err(|e| SessionError::Registry(format!("session map lock poisoned: {e}")))
    }

    /// Allocate a fresh session and purge any currently-expired entries.
    pub fn create(&self) -> Result<(Uuid, SessionHandle), SessionError> {
        let id = Uuid::new_v4();
        let handle: SessionHandle = Arc::new(tokio::sync::Mutex::new(SessionRecord::new(id)));

        let mut map = self.lock_map()?;
        map.insert(id, Arc::clone(&handle));
        Self::purge_expired(&mut map, self.timeout);
        debug!(session_id = %id, total = map.len(), "Session created");
        Ok((id, handle))
    }

    /// Look up a live session by id.
    ///
    /// An entry past its idle timeout is marked Expired, removed, and
    /// reported as NotFound; it is never returned to a caller as live.
    pub fn get(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        let mut map = self.lock_map()?;
        let Some(handle) = map.get(&id).cloned() else {
            return Err(SessionError::NotFound(id));
        };

        if let Ok(mut record) = handle.try_lock() {
            if record.is_expired(self.timeout) {
                record.status = SessionStatus::Expired;
                drop(record);
                map.remove(&id);
                debug!(session_id = %id, "Expired session evicted on access");
                return Err(SessionError::NotFound(id));
            }
        }
        // A held record lock means a turn is in flight, so the session is
        // live by definition.
        Ok(Arc::clone(map.get(&id).ok_or(SessionError::NotFound(id))?))
    }

    /// Remove a session. Returns false if the id was unknown.
    pub fn delete(&self, id: Uuid) -> Result<bool, SessionError> {
        let mut map = self.lock_map()?;
        let removed = map.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "Session deleted");
        }
        Ok(removed)
    }

    /// Snapshot counts: total entries and those still actively collecting.
    pub fn stats(&self) -> Result<RegistryStats, SessionError> {
        let map = self.lock_map()?;
        let total_sessions = map.len();
        let active_sessions = map
            .values()
            .filter(|handle| match handle.try_lock() {
                Ok(record) => {
                    record.status == SessionStatus::Active && !record.is_expired(self.timeout)
                }
                // Locked records are mid-turn.
                Err(_) => true,
            })
            .count();
        Ok(RegistryStats {
            total_sessions,
            active_sessions,
        })
    }

    fn purge_expired(map: &mut HashMap<Uuid, SessionHandle>, timeout: Duration) {
        map.retain(|id, handle| match handle.try_lock() {
            Ok(mut record) => {
                if record.is_expired(timeout) {
                    record.status = SessionStatus::Expired;
                    debug!(session_id = %id, "Expired session purged");
                    false
                } else {
                    true
                }
            }
            Err(_) => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(30)
    }

    async fn expire(handle: &SessionHandle, minutes: i64) {
        let mut record = handle.lock().await;
        record.last_activity = Utc::now() - Duration::minutes(minutes);
    }

    // ---- Create / get / delete ----

    #[tokio::test]
    async fn test_create_and_get() {
        let reg = registry();
        let (id, _) = reg.create().unwrap();
        let handle = reg.get(id).unwrap();
        let record = handle.lock().await;
        assert_eq!(record.id, id);
        assert_eq!(record.status, SessionStatus::Active);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let reg = registry();
        let err = reg.get(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let reg = registry();
        let (id, _) = reg.create().unwrap();
        assert!(reg.delete(id).unwrap());
        assert!(!reg.delete(id).unwrap());
        assert!(reg.get(id).is_err());
    }

    // ---- Expiry ----

    #[tokio::test]
    async fn test_expired_session_never_returned_live() {
        let reg = registry();
        let (id, handle) = reg.create().unwrap();
        expire(&handle, 31).await;

        let err = reg.get(id).unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
        // Record was marked expired before eviction.
        assert_eq!(handle.lock().await.status, SessionStatus::Expired);
        // And it is gone on the next lookup too.
        assert!(reg.get(id).is_err());
    }

    #[tokio::test]
    async fn test_create_purges_expired_entries() {
        let reg = registry();
        let (old_id, old_handle) = reg.create().unwrap();
        expire(&old_handle, 45).await;

        let (new_id, _) = reg.create().unwrap();
        let stats = reg.stats().unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert!(reg.get(new_id).is_ok());
        assert!(reg.get(old_id).is_err());
    }

    #[tokio::test]
    async fn test_fresh_create_unaffected_by_other_expiry() {
        let reg = registry();
        let (stale_id, stale) = reg.create().unwrap();
        expire(&stale, 31).await;

        let (fresh_id, _) = reg.create().unwrap();
        assert_ne!(stale_id, fresh_id);
        let handle = reg.get(fresh_id).unwrap();
        assert_eq!(handle.lock().await.group_index, 0);
    }

    #[tokio::test]
    async fn test_locked_record_is_treated_as_live() {
        let reg = registry();
        let (id, handle) = reg.create().unwrap();
        expire(&handle, 31).await;

        // Hold the record lock to simulate a turn in flight: get must not
        // evict it while locked.
        let guard = handle.lock().await;
        assert!(reg.get(id).is_ok());
        drop(guard);
        assert!(reg.get(id).is_err());
    }

    // ---- Stats ----

    #[tokio::test]
    async fn test_stats_counts() {
        let reg = registry();
        let (_, a) = reg.create().unwrap();
        let (_, _b) = reg.create().unwrap();
        let (_, c) = reg.create().unwrap();

        expire(&a, 31).await;
        c.lock().await.status = SessionStatus::Filling;

        let stats = reg.stats().unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.active_sessions, 1);
    }

    #[tokio::test]
    async fn test_stats_empty_registry() {
        let reg = registry();
        let stats = reg.stats().unwrap();
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.active_sessions, 0);
    }

    // ---- Isolation ----

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let reg = Arc::new(registry());
        let (id1, _) = reg.create().unwrap();
        let (id2, _) = reg.create().unwrap();

        let h1 = reg.get(id1).unwrap();
        let h2 = reg.get(id2).unwrap();
        {
            let mut r1 = h1.lock().await;
            r1.advance_group();
            r1.advance_group();
        }
        assert_eq!(h2.lock().await.group_index, 0);
        assert_eq!(h1.lock().await.group_index, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates() {
        let reg = Arc::new(registry());
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let reg = Arc::clone(&reg);
            tasks.push(tokio::spawn(async move { reg.create().unwrap().0 }));
        }
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(reg.stats().unwrap().total_sessions, 16);
    }
}
