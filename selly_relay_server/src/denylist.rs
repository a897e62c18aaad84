//! Addresses that have presented a wrong webhook secret.
//!
//! The list is bounded by a size-limited cache: when it is full, the cache's eviction policy makes room. Entries can
//! optionally expire. Nothing is persisted, so a restart clears the list.

use std::{net::IpAddr, time::Duration};

use log::*;
use mini_moka::sync::{Cache, ConcurrentCacheExt};

/// The cache refuses expiry times above 1000 years. Anything longer is as good as forever.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

pub struct Denylist {
    // None when denylisting is disabled
    cache: Option<Cache<IpAddr, ()>>,
}

impl Denylist {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        if capacity == 0 {
            info!("🚫️ Denylist capacity is zero. Callers with a wrong secret will not be blocked.");
            return Self { cache: None };
        }
        let mut builder = Cache::<IpAddr, ()>::builder().max_capacity(capacity as u64);
        match ttl {
            Some(ttl) if ttl <= MAX_TTL => builder = builder.time_to_live(ttl),
            Some(ttl) => warn!("🚫️ Denylist TTL of {}s is too long. Entries will not expire.", ttl.as_secs()),
            None => {},
        }
        Self { cache: Some(builder.build()) }
    }

    /// Adds `ip` to the list. Returns false if it was already there (or denylisting is disabled).
    pub fn insert(&self, ip: IpAddr) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        if cache.get(&ip).is_some() {
            return false;
        }
        cache.insert(ip, ());
        debug!("🚫️ {ip} added to the denylist");
        true
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.cache.as_ref().is_some_and(|c| c.get(ip).is_some())
    }

    /// Number of denied addresses, after pending evictions and expiries have been applied.
    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| {
            c.sync();
            c.entry_count() as usize
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
