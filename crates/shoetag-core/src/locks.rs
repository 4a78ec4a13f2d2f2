//! Per-key mutual exclusion.
//!
//! Commands touching the same key queue behind each other; commands on
//! different keys never contend beyond a short map lookup.

use std::{
  collections::HashMap,
  hash::Hash,
  sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct KeyLocks<K> {
  slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash> KeyLocks<K> {
  pub fn new() -> Self { Self { slots: Mutex::new(HashMap::new()) } }

  /// Wait for exclusive access to `key`. Access ends when the guard drops.
  pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
    let slot = {
      let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      // A slot referenced only by the map has no holder and no waiter.
      slots.retain(|_, slot| Arc::strong_count(slot) > 1);
      Arc::clone(slots.entry(key).or_default())
    };
    slot.lock_owned().await
  }

  /// Keys currently held or awaited.
  pub fn active(&self) -> usize {
    let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots.values().filter(|slot| Arc::strong_count(slot) > 1).count()
  }
}

impl<K: Eq + Hash> Default for KeyLocks<K> {
  fn default() -> Self { Self::new() }
}
