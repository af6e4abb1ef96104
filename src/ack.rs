use std::collections::HashMap;
use std::hash::Hash;

use time::{Duration, OffsetDateTime};

/// How long a field stays acknowledged after a copy.
pub const ACK_DELAY: Duration = Duration::seconds(2);

/// Keyed "just copied" flags that clear themselves after [`ACK_DELAY`].
///
/// Each key holds at most one deadline; acknowledging again replaces it.
/// Keys never affect each other.
#[derive(Debug)]
pub struct AcknowledgementTimer<K> {
    expiries: HashMap<K, OffsetDateTime>,
    delay: Duration,
}

impl<K> Default for AcknowledgementTimer<K> {
    fn default() -> Self {
        Self {
            expiries: HashMap::new(),
            delay: ACK_DELAY,
        }
    }
}

impl<K: Copy + Eq + Hash> AcknowledgementTimer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` acknowledged until `now + ACK_DELAY`, restarting any
    /// pending delay for the same key.
    pub fn acknowledge(&mut self, key: K, now: OffsetDateTime) {
        self.expiries.insert(key, now + self.delay);
    }

    pub fn is_acknowledged(&self, key: K, now: OffsetDateTime) -> bool {
        self.expiries.get(&key).is_some_and(|expiry| now < *expiry)
    }

    /// Drop every deadline that has passed at `now` and return the keys that
    /// reverted.
    pub fn expire(&mut self, now: OffsetDateTime) -> Vec<K> {
        let expired: Vec<K> = self
            .expiries
            .iter()
            .filter(|(_, expiry)| now >= **expiry)
            .map(|(key, _)| *key)
            .collect();
        for key in &expired {
            self.expiries.remove(key);
        }
        expired
    }

    /// Cancel every pending acknowledgement.
    pub fn cancel_all(&mut self) {
        self.expiries.clear();
    }

    pub fn pending(&self) -> usize {
        self.expiries.len()
    }
}
