//! Device registry: one live proxy per device identifier.
//!
//! Entries are replaced wholesale on reconfiguration; there is no partial
//! update and no removal. Each entry owns its proxy behind an async mutex so
//! every exchange with a given receiver is serialised, while different
//! receivers proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, MutexGuard};

use avsync_domain::id::DeviceId;

/// A registered device and exclusive access to its proxy.
pub struct DeviceHandle<P> {
    id: DeviceId,
    proxy: Mutex<P>,
}

impl<P> DeviceHandle<P> {
    fn new(id: DeviceId, proxy: P) -> Self {
        Self {
            id,
            proxy: Mutex::new(proxy),
        }
    }

    /// The identifier this handle was registered under.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Wait for exclusive access to the proxy.
    ///
    /// Hold the guard for the whole cycle so a read, write, and re-read are
    /// not interleaved with another cycle on the same device.
    pub async fn lock(&self) -> MutexGuard<'_, P> {
        self.proxy.lock().await
    }
}

/// Map of device identifier to its active proxy.
pub struct DeviceRegistry<P> {
    devices: RwLock<HashMap<DeviceId, Arc<DeviceHandle<P>>>>,
}

impl<P> Default for DeviceRegistry<P> {
    fn default() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl<P> DeviceRegistry<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `proxy` for `id`, replacing any previous entry.
    ///
    /// Returns `true` when an existing entry was replaced. Cycles already
    /// running against the old proxy finish on it; later lookups see the new one.
    pub fn register(&self, id: DeviceId, proxy: P) -> bool {
        let handle = Arc::new(DeviceHandle::new(id.clone(), proxy));
        let replaced = self
            .devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), handle)
            .is_some();
        if replaced {
            tracing::info!(device = %id, "device proxy replaced");
        } else {
            tracing::debug!(device = %id, "device proxy registered");
        }
        replaced
    }

    /// The active handle for `id`.
    #[must_use]
    pub fn lookup(&self, id: &DeviceId) -> Option<Arc<DeviceHandle<P>>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Every active handle, ordered by device identifier.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<DeviceHandle<P>>> {
        let mut handles: Vec<_> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        handles.sort_by(|a, b| a.id.cmp(&b.id));
        handles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
