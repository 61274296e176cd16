//! First-seen connection timestamps keyed by device key

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};

/// Cache of the instant each device key was first observed as connected
///
/// A recorded instant never changes until the key is evicted with
/// [`ConnectionTimes::retain_keys`]. Shared between the polling task and any
/// readers, so every access goes through one mutex.
#[derive(Debug)]
pub struct ConnectionTimes {
    clock: Arc<dyn Clock>,
    times: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ConnectionTimes {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            times: Mutex::new(HashMap::new()),
        }
    }

    /// Return the recorded instant for `key`, recording "now" if absent
    pub fn get(&self, key: &str) -> DateTime<Utc> {
        let mut times = self.lock();
        if let Some(time) = times.get(key) {
            return *time;
        }

        let now = self.clock.now();
        tracing::debug!("Recording first connection of {} at {}", key, now);
        times.insert(key.to_string(), now);
        now
    }

    /// Look up `key` without recording anything
    pub fn peek(&self, key: &str) -> Option<DateTime<Utc>> {
        self.lock().get(key).copied()
    }

    /// Evict every key not in `keys`
    ///
    /// Returns the number of evicted entries.
    pub fn retain_keys<'a, I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = keys.into_iter().collect();
        let mut times = self.lock();
        let before = times.len();
        times.retain(|key, _| keep.contains(key.as_str()));
        let evicted = before - times.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} disconnected device key(s)", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The map is always left consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.times.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConnectionTimes {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Duration;

    /// Clock that advances one second per call
    #[derive(Debug)]
    struct TickingClock {
        start: DateTime<Utc>,
        ticks: Mutex<i64>,
    }

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut ticks = self.ticks.lock().unwrap();
            *ticks += 1;
            self.start + Duration::seconds(*ticks)
        }
    }

    fn ticking() -> Arc<TickingClock> {
        Arc::new(TickingClock {
            start: DateTime::parse_from_rfc3339("2018-11-28T01:15:27Z")
                .unwrap()
                .with_timezone(&Utc),
            ticks: Mutex::new(0),
        })
    }

    #[test]
    fn test_get_records_once() {
        let times = ConnectionTimes::new(ticking());

        let first = times.get("emulator-5554");
        let second = times.get("emulator-5554");

        assert_eq!(first, second);
        assert_eq!(times.len(), 1);
    }

    #[test]
    fn test_distinct_keys_get_distinct_times() {
        let times = ConnectionTimes::new(ticking());

        let a = times.get("86UX00F4R");
        let b = times.get("emulator-5554");

        assert!(b > a);
    }

    #[test]
    fn test_peek_does_not_record() {
        let clock = Arc::new(FixedClock::parse("2018-11-28T01:15:27Z").unwrap());
        let times = ConnectionTimes::new(clock);

        assert_eq!(times.peek("86UX00F4R"), None);
        assert!(times.is_empty());

        let recorded = times.get("86UX00F4R");
        assert_eq!(times.peek("86UX00F4R"), Some(recorded));
    }

    #[test]
    fn test_retain_keys_evicts_and_refreshes() {
        let times = ConnectionTimes::new(ticking());
        let original = times.get("Pixel_3_API_Q");
        times.get("86UX00F4R");

        let evicted = times.retain_keys(["86UX00F4R"]);
        assert_eq!(evicted, 1);
        assert_eq!(times.peek("Pixel_3_API_Q"), None);

        // Reconnecting after eviction gets a fresh timestamp
        let reconnected = times.get("Pixel_3_API_Q");
        assert!(reconnected > original);
    }

    #[test]
    fn test_retain_keys_empty_clears_everything() {
        let times = ConnectionTimes::default();
        times.get("a");
        times.get("b");

        assert_eq!(times.retain_keys(std::iter::empty()), 2);
        assert!(times.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let clock = Arc::new(FixedClock::parse("2018-11-28T01:15:27Z").unwrap());
        let times = Arc::new(ConnectionTimes::new(clock));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let times = Arc::clone(&times);
                std::thread::spawn(move || times.get(&format!("device-{}", i % 2)))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(times.len(), 2);
    }
}
