// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fences foreign namespaces while a cleanup sweep runs on them

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Per-namespace gate between mirror writes and cleanup sweeps.
///
/// A write holds a shared permit for the whole foreign call. Raising the
/// fence takes the exclusive side: it waits for in-flight writes to land,
/// then turns new writes away until the guard is dropped.
#[derive(Debug, Default)]
pub struct TeardownFence {
    gates: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl TeardownFence {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn gate(&self, namespace: &str) -> Arc<RwLock<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(gates.entry(namespace.to_string()).or_default())
    }

    /// Fence `namespace` until the returned guard is dropped.
    /// Resolves once every write already admitted has finished.
    pub async fn raise(&self, namespace: &str) -> FenceGuard {
        FenceGuard {
            _guard: self.gate(namespace).write_owned().await,
        }
    }

    /// Admit a write into `namespace`; `None` while a sweep holds or awaits the fence
    pub fn enter(&self, namespace: &str) -> Option<WritePermit> {
        self.gate(namespace)
            .try_read_owned()
            .ok()
            .map(|guard| WritePermit { _guard: guard })
    }

    pub fn is_raised(&self, namespace: &str) -> bool {
        self.enter(namespace).is_none()
    }
}

/// Held by a sweep
pub struct FenceGuard {
    _guard: OwnedRwLockWriteGuard<()>,
}

/// Held by a write for the duration of its foreign call
pub struct WritePermit {
    _guard: OwnedRwLockReadGuard<()>,
}
