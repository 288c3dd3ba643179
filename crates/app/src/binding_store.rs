//! In-memory [`BindingStore`] with atomic whole-set replacement.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use avsync_domain::binding::ItemBinding;
use avsync_domain::id::{DeviceId, ItemId};

use crate::ports::BindingStore;

type Snapshot = Arc<HashMap<ItemId, ItemBinding>>;

/// Bindings held in memory as an immutable snapshot.
///
/// [`replace_all`](Self::replace_all) swaps the snapshot in one step; readers
/// keep whichever snapshot they loaded.
#[derive(Default)]
pub struct InMemoryBindingStore {
    snapshot: RwLock<Snapshot>,
}

impl InMemoryBindingStore {
    /// Build a store from `bindings`. A later binding for the same item wins.
    #[must_use]
    pub fn new(bindings: impl IntoIterator<Item = ItemBinding>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(index(bindings))),
        }
    }

    /// Replace every binding at once.
    pub fn replace_all(&self, bindings: impl IntoIterator<Item = ItemBinding>) {
        let next = Arc::new(index(bindings));
        tracing::info!(count = next.len(), "item bindings replaced");
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }
}

fn index(bindings: impl IntoIterator<Item = ItemBinding>) -> HashMap<ItemId, ItemBinding> {
    bindings
        .into_iter()
        .map(|binding| (binding.item_id.clone(), binding))
        .collect()
}

impl BindingStore for InMemoryBindingStore {
    fn resolve_item(&self, item_id: &ItemId) -> Option<ItemBinding> {
        self.load().get(item_id).cloned()
    }

    fn bindings_for_device(&self, device_id: &DeviceId) -> Vec<ItemBinding> {
        let mut bindings: Vec<_> = self
            .load()
            .values()
            .filter(|binding| &binding.device_id == device_id)
            .cloned()
            .collect();
        bindings.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        bindings
    }
}
