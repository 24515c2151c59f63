//! seen.rs: bounded cross-poll memory of delivered fixtures (by dedupe key).
//!
//! An id stays "seen" for `retention` after its first sighting (later
//! sightings do not extend it). When `capacity` is exceeded, the oldest
//! entries are evicted first.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Inner {
    order: VecDeque<(String, DateTime<Utc>)>,
    first_seen: HashMap<String, DateTime<Utc>>,
}

#[derive(Debug)]
pub struct SeenCache {
    retention: Duration,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl SeenCache {
    pub fn new(retention: Duration, capacity: usize) -> Self {
        Self {
            retention,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// True if `id` is new (or expired) and is now recorded as seen at `now`.
    pub fn check_and_insert(&self, id: &str, now: DateTime<Utc>) -> bool {
        let mut g = self.inner.lock();
        self.purge_locked(&mut g, now);
        if g.first_seen.contains_key(id) {
            return false;
        }
        g.first_seen.insert(id.to_string(), now);
        g.order.push_back((id.to_string(), now));
        while g.order.len() > self.capacity {
            if let Some((old, _)) = g.order.pop_front() {
                g.first_seen.remove(&old);
            }
        }
        true
    }

    pub fn contains(&self, id: &str, now: DateTime<Utc>) -> bool {
        let g = self.inner.lock();
        g.first_seen
            .get(id)
            .is_some_and(|at| now - *at < self.retention)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_locked(&self, g: &mut Inner, now: DateTime<Utc>) {
        while let Some((_, at)) = g.order.front() {
            if now - *at < self.retention {
                break;
            }
            if let Some((id, _)) = g.order.pop_front() {
                g.first_seen.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_sighting_within_retention_is_suppressed() {
        let c = SeenCache::new(Duration::hours(24), 100);
        let t0 = Utc::now();
        assert!(c.check_and_insert("m-1", t0));
        assert!(!c.check_and_insert("m-1", t0 + Duration::hours(3)));
        assert!(c.contains("m-1", t0 + Duration::hours(23)));
    }

    #[test]
    fn retention_counts_from_first_sighting() {
        let c = SeenCache::new(Duration::hours(1), 100);
        let t0 = Utc::now();
        assert!(c.check_and_insert("m-1", t0));
        assert!(!c.check_and_insert("m-1", t0 + Duration::minutes(50)));
        assert!(c.check_and_insert("m-1", t0 + Duration::minutes(61)));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let c = SeenCache::new(Duration::hours(24), 2);
        let t0 = Utc::now();
        assert!(c.check_and_insert("a", t0));
        assert!(c.check_and_insert("b", t0));
        assert!(c.check_and_insert("c", t0));
        assert_eq!(c.len(), 2);
        assert!(c.check_and_insert("a", t0));
        assert!(!c.contains("b", t0));
    }
}
