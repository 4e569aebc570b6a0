//! Per-identity async mutexes.
//!
//! Pair operations always lock both identities in lexicographic order so
//! two tasks touching the same pair cannot deadlock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use chateo_core::Identity;

/// Lazily created mutex per identity.
#[derive(Debug, Default)]
pub struct IdentityLocks {
    locks: DashMap<Identity, Arc<Mutex<()>>>,
}

/// Guards held for the duration of a pair operation.
#[derive(Debug)]
pub struct PairGuard {
    _first: OwnedMutexGuard<()>,
    _second: Option<OwnedMutexGuard<()>>,
}

impl IdentityLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex(&self, identity: &Identity) -> Arc<Mutex<()>> {
        self.locks
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Lock a single identity.
    pub async fn lock(&self, identity: &Identity) -> OwnedMutexGuard<()> {
        self.mutex(identity).lock_owned().await
    }

    /// Lock both identities in a fixed order. Locks once if they are equal.
    pub async fn lock_pair(&self, a: &Identity, b: &Identity) -> PairGuard {
        if a == b {
            return PairGuard {
                _first: self.lock(a).await,
                _second: None,
            };
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let first = self.lock(low).await;
        let second = self.lock(high).await;
        PairGuard {
            _first: first,
            _second: Some(second),
        }
    }

    /// Number of identities that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no identity has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
