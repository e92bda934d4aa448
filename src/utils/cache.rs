/// Size- and time-bounded cache used by the exchange fetchers
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Source of "now" for freshness checks
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub struct TtlCache<K, V, C = SystemClock> {
    entries: HashMap<K, (Instant, V)>,
    /// Keys in insertion order, oldest first
    order: VecDeque<K>,
    /// Max number of entries kept
    capacity: usize,
    /// Freshness window
    ttl: Duration,
    clock: C,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, SystemClock)
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    pub fn with_clock(capacity: usize, ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            ttl,
            clock,
        }
    }

    /// Fresh value for `key`, dropping it if it has expired
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some((inserted, value)) => {
                if now.duration_since(*inserted) < self.ttl {
                    return Some(value.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.remove(key);
        }
        None
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let now = self.clock.now();
        self.remove(&key);
        self.purge_expired(now);

        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, (now, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn remove(&mut self, key: &K) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        // Insertion order is also expiry order
        while let Some(front) = self.order.front() {
            let stale = self
                .entries
                .get(front)
                .map_or(true, |(inserted, _)| now.duration_since(*inserted) >= self.ttl);
            if !stale {
                break;
            }
            if let Some(key) = self.order.pop_front() {
                self.entries.remove(&key);
            }
        }
    }
}
