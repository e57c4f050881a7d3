use crate::domain_port::*;
use crate::infra_memory::{Clock, SystemClock};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Redis TTL reply for a missing key.
const TTL_ABSENT: i64 = -2;

#[derive(Debug, Clone)]
struct Record {
    value: Vec<u8>,
    expires_at: i64,
}

/// In-process store with redis-like TTL semantics. Expired keys are evicted
/// lazily on access.
#[derive(Debug)]
pub struct MemorySessionStore {
    entries: DashMap<String, Record>,
    clock: Arc<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemorySessionStore {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Number of keys that have not expired yet.
    pub fn live_keys(&self) -> usize {
        let now = self.clock.now();
        self.entries.iter().filter(|r| r.expires_at > now).count()
    }

    fn expiry(&self, ttl_secs: u64) -> i64 {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        self.clock.now().saturating_add(ttl)
    }

    fn read_live<T>(&self, key: &str, f: impl FnOnce(&Record, i64) -> T) -> Option<T> {
        let now = self.clock.now();
        let found = self
            .entries
            .get(key)
            .map(|r| if r.expires_at > now { Some(f(&*r, now)) } else { None });
        match found {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, r| r.expires_at <= now);
                None
            }
            None => None,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SessionStoreError> {
        Ok(self.read_live(key, |r, _| r.value.clone()))
    }

    async fn set_ex(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), SessionStoreError> {
        let record = Record {
            value: value.to_vec(),
            expires_at: self.expiry(ttl_secs),
        };
        self.entries.insert(key.to_string(), record);
        Ok(())
    }

    async fn remaining_ttl(&self, key: &str) -> Result<i64, SessionStoreError> {
        Ok(self
            .read_live(key, |r, now| r.expires_at - now)
            .unwrap_or(TTL_ABSENT))
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn try_lock(&self, key: &str, ttl_secs: u64) -> Result<bool, SessionStoreError> {
        let now = self.clock.now();
        let record = Record {
            value: b"1".to_vec(),
            expires_at: self.expiry(ttl_secs),
        };
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut held) => {
                if held.get().expires_at > now {
                    Ok(false)
                } else {
                    held.insert(record);
                    Ok(true)
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }
}
