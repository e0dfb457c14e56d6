//! Per-host connection ceiling.
//!
//! Every in-flight exchange holds a permit for its host; the permit is
//! released when the exchange finishes or its task is aborted. A host's entry
//! is dropped once its last permit is released, so the map only holds hosts
//! with exchanges in flight.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::transport::TransportError;

/// Tracks in-flight exchanges per host and enforces a fixed maximum.
#[derive(Debug)]
pub struct HostLimits {
    per_host: usize,
    hosts: Arc<DashMap<String, Arc<Semaphore>>>,
}

/// A reserved slot for one host. Releasing the last slot evicts the host.
#[derive(Debug)]
pub struct HostPermit {
    permit: Option<OwnedSemaphorePermit>,
    host: String,
    per_host: usize,
    hosts: Arc<DashMap<String, Arc<Semaphore>>>,
}

impl Drop for HostPermit {
    fn drop(&mut self) {
        drop(self.permit.take());
        // Acquisition happens under the same shard lock, so an idle
        // semaphore cannot gain a permit between this check and the removal.
        self.hosts
            .remove_if(&self.host, |_, semaphore| {
                semaphore.available_permits() == self.per_host
            });
    }
}

impl HostLimits {
    /// Create limits allowing `per_host` concurrent exchanges to each host.
    pub fn new(per_host: usize) -> Self {
        Self {
            per_host: per_host.clamp(1, Semaphore::MAX_PERMITS),
            hosts: Arc::new(DashMap::new()),
        }
    }

    /// Maximum concurrent exchanges per host.
    pub fn per_host(&self) -> usize {
        self.per_host
    }

    /// Try to reserve a slot for `host`. Fails fast when the ceiling is hit.
    pub fn try_acquire(&self, host: &str) -> Result<HostPermit, TransportError> {
        let entry = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host)));

        let permit = entry
            .value()
            .clone()
            .try_acquire_owned()
            .map_err(|_| TransportError::PoolExhausted {
                host: host.to_string(),
            })?;
        drop(entry);

        Ok(HostPermit {
            permit: Some(permit),
            host: host.to_string(),
            per_host: self.per_host,
            hosts: Arc::clone(&self.hosts),
        })
    }

    /// Number of exchanges currently holding a slot for `host`.
    pub fn in_flight(&self, host: &str) -> usize {
        self.hosts
            .get(host)
            .map(|s| self.per_host - s.available_permits())
            .unwrap_or(0)
    }

    /// Hosts with at least one exchange in flight.
    pub fn tracked_hosts(&self) -> usize {
        self.hosts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_enforced_per_host() {
        let limits = HostLimits::new(2);

        let p1 = limits.try_acquire("a:80").unwrap();
        let _p2 = limits.try_acquire("a:80").unwrap();
        assert_eq!(limits.in_flight("a:80"), 2);

        let err = limits.try_acquire("a:80").unwrap_err();
        assert_eq!(err, TransportError::PoolExhausted { host: "a:80".into() });

        // Other hosts are unaffected
        assert!(limits.try_acquire("b:80").is_ok());

        drop(p1);
        assert_eq!(limits.in_flight("a:80"), 1);
        assert!(limits.try_acquire("a:80").is_ok());
    }

    #[test]
    fn test_idle_hosts_are_evicted() {
        let limits = HostLimits::new(4);

        for i in 0..100 {
            let host = format!("10.0.0.{}:80", i);
            let permit = limits.try_acquire(&host).unwrap();
            assert_eq!(limits.in_flight(&host), 1);
            drop(permit);
        }
        assert_eq!(limits.tracked_hosts(), 0);

        let p1 = limits.try_acquire("a:80").unwrap();
        let p2 = limits.try_acquire("a:80").unwrap();
        drop(p1);
        assert_eq!(limits.tracked_hosts(), 1);
        assert_eq!(limits.in_flight("a:80"), 1);
        drop(p2);
        assert_eq!(limits.tracked_hosts(), 0);
    }

    #[test]
    fn test_exhausted_host_is_kept() {
        let limits = HostLimits::new(1);
        let _held = limits.try_acquire("a:80").unwrap();
        assert!(limits.try_acquire("a:80").is_err());
        assert_eq!(limits.in_flight("a:80"), 1);
    }

    #[test]
    fn test_zero_is_clamped() {
        let limits = HostLimits::new(0);
        assert_eq!(limits.per_host(), 1);
        assert_eq!(limits.in_flight("unknown"), 0);
    }
}
