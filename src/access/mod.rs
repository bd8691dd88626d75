//! Upload permission checks.
//!
//! [`AccessGate`] keeps a read-through cache of the `can_upload` flag in
//! front of the store. The store is the only source of truth; the cache is
//! invalidated after every grant.

use crate::recording::RecordingStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct AccessGate {
    store: Arc<dyn RecordingStore>,
    admin_id: Option<i64>,
    /// principal id -> can_upload
    cache: Mutex<HashMap<i64, bool>>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn RecordingStore>, admin_id: Option<i64>) -> Self {
        Self {
            store,
            admin_id,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a gate with every authorized principal already cached.
    pub fn warmed(store: Arc<dyn RecordingStore>, admin_id: Option<i64>) -> Result<Self> {
        let gate = Self::new(store, admin_id);
        let authorized = gate.store.list_authorized_principals()?;
        info!("Loaded {} authorized uploaders", authorized.len());
        {
            let mut cache = gate.cache.lock().unwrap();
            for id in authorized {
                cache.insert(id, true);
            }
        }
        Ok(gate)
    }

    /// Whether `principal_id` may submit recordings. Unknown principals are
    /// not authorized.
    pub fn is_authorized(&self, principal_id: i64) -> Result<bool> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(allowed) = cache.get(&principal_id) {
            return Ok(*allowed);
        }

        let allowed = self
            .store
            .get_principal(principal_id)?
            .map(|p| p.can_upload)
            .unwrap_or(false);
        debug!("Cached upload permission {} for {}", allowed, principal_id);
        cache.insert(principal_id, allowed);
        Ok(allowed)
    }

    /// Grants upload permission. The store is written before the cached
    /// entry is dropped, both under the cache lock.
    pub fn grant(&self, principal_id: i64) -> Result<()> {
        let mut cache = self.cache.lock().unwrap();
        self.store.grant_upload(principal_id)?;
        cache.remove(&principal_id);
        info!("Granted upload permission to {}", principal_id);
        Ok(())
    }

    /// First contact. Records the username without touching the permission.
    pub fn register(&self, principal_id: i64, username: Option<&str>) -> Result<()> {
        self.store.upsert_principal(principal_id, username)
    }

    /// No configured admin means nobody is admin.
    pub fn is_admin(&self, principal_id: i64) -> bool {
        self.admin_id == Some(principal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::SqliteRecordingStore;

    const ADMIN: i64 = 1;

    fn store() -> Arc<SqliteRecordingStore> {
        Arc::new(SqliteRecordingStore::in_memory().unwrap())
    }

    #[test]
    fn test_unknown_principal_is_not_authorized() {
        let gate = AccessGate::new(store(), Some(ADMIN));
        assert!(!gate.is_authorized(42).unwrap());
    }

    #[test]
    fn test_registered_principal_is_not_authorized() {
        let gate = AccessGate::new(store(), Some(ADMIN));
        gate.register(42, Some("bob")).unwrap();
        assert!(!gate.is_authorized(42).unwrap());
    }

    #[test]
    fn test_warmed_gate_loads_authorized_principals() {
        let store = store();
        store.grant_upload(7).unwrap();
        store.grant_upload(8).unwrap();

        let gate = AccessGate::warmed(store, None).unwrap();
        assert!(gate.is_authorized(7).unwrap());
        assert!(gate.is_authorized(8).unwrap());
        assert!(!gate.is_authorized(9).unwrap());
    }

    #[test]
    fn test_grant_invalidates_cached_denial() {
        let store = store();
        let gate = AccessGate::new(store.clone(), Some(ADMIN));

        assert!(!gate.is_authorized(42).unwrap());
        gate.grant(42).unwrap();

        assert!(gate.is_authorized(42).unwrap());
        assert!(store.get_principal(42).unwrap().unwrap().can_upload);
    }

    #[test]
    fn test_register_after_grant_keeps_permission() {
        let gate = AccessGate::new(store(), Some(ADMIN));
        gate.grant(42).unwrap();
        gate.register(42, Some("bob")).unwrap();

        assert!(gate.is_authorized(42).unwrap());
    }

    #[test]
    fn test_is_admin() {
        let gate = AccessGate::new(store(), Some(ADMIN));
        assert!(gate.is_admin(ADMIN));
        assert!(!gate.is_admin(2));

        let no_admin = AccessGate::new(store(), None);
        assert!(!no_admin.is_admin(ADMIN));
    }
}
