//! In-process keyed locks serialising the critical sections of the engine.
//!
//! Callers taking more than one lock take them in the order
//! appointment, professional, machine.

use std::{collections::HashMap, fmt, sync::Arc};

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum LockKey {
    Appointment(Uuid),
    Professional(Uuid, NaiveDate),
    Machine(Uuid, NaiveDate),
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Appointment(id) => write!(f, "appointment:{id}"),
            Self::Professional(id, date) => write!(f, "professional:{id}:{date}"),
            Self::Machine(id, date) => write!(f, "machine:{id}:{date}"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    locks: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Wait for the lock of `key`. It is held until the guard is dropped.
    pub(crate) async fn acquire(&self, key: LockKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits for only keep the map growing.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        tracing::trace!(%key, "waiting for lock");
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
