//! Expiring in-process cache with an injectable clock.

use std::{hash::Hash, time::Instant};

use crate::{entity::commission_rule, prelude::*};

pub trait Clock: Send + Sync {
  fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

pub struct TtlCache<K, V> {
  entries: DashMap<K, (V, Instant)>,
  ttl: Duration,
  clock: Arc<dyn Clock>,
}

/// Active rules of a pay plan, keyed by plan id.
pub type RuleCache = TtlCache<i32, Arc<Vec<commission_rule::Model>>>;

impl<K, V> TtlCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub fn new(ttl: Duration) -> Self {
    Self::with_clock(ttl, Arc::new(SystemClock))
  }

  pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
    Self { entries: DashMap::new(), ttl, clock }
  }

  /// Returns the cached value unless it has outlived the ttl.
  pub fn get(&self, key: &K) -> Option<V> {
    let entry = self.entries.get(key)?;
    let (value, inserted_at) = entry.value();

    if self.clock.now().duration_since(*inserted_at) >= self.ttl {
      return None;
    }
    Some(value.clone())
  }

  pub fn insert(&self, key: K, value: V) {
    self.entries.insert(key, (value, self.clock.now()));
  }

  pub fn invalidate(&self, key: &K) {
    self.entries.remove(key);
  }

  pub fn purge_expired(&self) -> usize {
    let now = self.clock.now();
    let before = self.entries.len();
    self
      .entries
      .retain(|_, (_, inserted_at)| now.duration_since(*inserted_at) < self.ttl);
    before - self.entries.len()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }
}

#[cfg(test)]
pub mod tests {
  use std::sync::Mutex;

  use super::*;

  pub struct ManualClock(Mutex<Instant>);

  impl ManualClock {
    pub fn new() -> Arc<Self> {
      Arc::new(Self(Mutex::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
      *self.0.lock().unwrap() += by;
    }
  }

  impl Clock for ManualClock {
    fn now(&self) -> Instant {
      *self.0.lock().unwrap()
    }
  }

  #[test]
  fn test_entry_expires_after_ttl() {
    let clock = ManualClock::new();
    let cache: TtlCache<i32, &str> =
      TtlCache::with_clock(Duration::from_secs(60), clock.clone());

    cache.insert(1, "plan");
    assert_eq!(cache.get(&1), Some("plan"));

    clock.advance(Duration::from_secs(59));
    assert_eq!(cache.get(&1), Some("plan"));

    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get(&1), None);
  }

  #[test]
  fn test_purge_drops_only_expired() {
    let clock = ManualClock::new();
    let cache: TtlCache<i32, i32> =
      TtlCache::with_clock(Duration::from_secs(10), clock.clone());

    cache.insert(1, 1);
    clock.advance(Duration::from_secs(6));
    cache.insert(2, 2);
    clock.advance(Duration::from_secs(6));

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&2), Some(2));
  }

  #[test]
  fn test_invalidate() {
    let cache: TtlCache<i32, i32> = TtlCache::new(Duration::from_secs(10));
    cache.insert(7, 70);
    cache.invalidate(&7);
    assert_eq!(cache.get(&7), None);
  }
}
