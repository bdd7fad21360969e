//! Short-lived cache for read-only views.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use rentbook_domain::Room;
use tracing::debug;

use crate::{report_service::OccupancyStats, time::Clock};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;
const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Rooms,
    Stats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Rooms(Vec<Room>),
    Stats(OccupancyStats),
}

impl CachedValue {
    fn key(&self) -> CacheKey {
        match self {
            CachedValue::Rooms(_) => CacheKey::Rooms,
            CachedValue::Stats(_) => CacheKey::Stats,
        }
    }
}

/// Entries expire after the TTL and are dropped wholesale on any write.
pub struct ReadCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: HashMap<CacheKey, (DateTime<Utc>, CachedValue)>,
}

impl ReadCache {
    pub fn new(clock: Arc<dyn Clock>, ttl_secs: u64) -> Self {
        Self {
            clock,
            ttl: Duration::seconds(ttl_secs.min(MAX_CACHE_TTL_SECS) as i64),
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: CacheKey) -> Option<&CachedValue> {
        let now = self.clock.now();
        let expired = match self.entries.get(&key) {
            Some((stored_at, _)) => now - *stored_at >= self.ttl,
            None => return None,
        };
        if expired {
            debug!(?key, "cache entry expired");
            self.entries.remove(&key);
            return None;
        }
        self.entries.get(&key).map(|(_, value)| value)
    }

    pub fn insert(&mut self, value: CachedValue) {
        let now = self.clock.now();
        self.entries.insert(value.key(), (now, value));
    }

    pub fn rooms_or_insert_with(&mut self, load: impl FnOnce() -> Vec<Room>) -> Vec<Room> {
        if let Some(CachedValue::Rooms(rooms)) = self.get(CacheKey::Rooms) {
            return rooms.clone();
        }
        let rooms = load();
        self.insert(CachedValue::Rooms(rooms.clone()));
        rooms
    }

    pub fn stats_or_insert_with(&mut self, load: impl FnOnce() -> OccupancyStats) -> OccupancyStats {
        if let Some(CachedValue::Stats(stats)) = self.get(CacheKey::Stats) {
            return *stats;
        }
        let stats = load();
        self.insert(CachedValue::Stats(stats));
        stats
    }

    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            debug!(entries = self.entries.len(), "cache invalidated");
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StepClock(Mutex<DateTime<Utc>>);

    impl StepClock {
        fn advance(&self, secs: i64) {
            let mut now = self.0.lock().unwrap();
            *now = *now + Duration::seconds(secs);
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn stats(total_rooms: usize) -> OccupancyStats {
        OccupancyStats {
            total_rooms,
            ..OccupancyStats::default()
        }
    }

    #[test]
    fn entries_expire_after_ttl() {
        let clock = Arc::new(StepClock(Mutex::new(Utc::now())));
        let mut cache = ReadCache::new(clock.clone(), 30);

        assert_eq!(cache.stats_or_insert_with(|| stats(1)).total_rooms, 1);
        clock.advance(29);
        assert_eq!(cache.stats_or_insert_with(|| stats(2)).total_rooms, 1);
        clock.advance(1);
        assert_eq!(cache.stats_or_insert_with(|| stats(3)).total_rooms, 3);
    }

    #[test]
    fn invalidation_drops_every_key() {
        let clock = Arc::new(StepClock(Mutex::new(Utc::now())));
        let mut cache = ReadCache::new(clock, 30);
        cache.insert(CachedValue::Stats(stats(1)));
        cache.insert(CachedValue::Rooms(Vec::new()));
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(cache.get(CacheKey::Rooms).is_none());
    }
}
