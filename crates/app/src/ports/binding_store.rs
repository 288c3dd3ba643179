//! Binding store port: item binding lookups consumed by the engine.
//!
//! The store is read-only from the engine's point of view. Reloads must swap
//! the whole binding set at once so a cycle never sees a half-updated store.

use avsync_domain::binding::ItemBinding;
use avsync_domain::id::{DeviceId, ItemId};

/// Forward and reverse lookup of [`ItemBinding`]s.
pub trait BindingStore: Send + Sync {
    /// The binding declared for `item_id`, if any.
    fn resolve_item(&self, item_id: &ItemId) -> Option<ItemBinding>;

    /// Every binding that references `device_id`. Order is unspecified.
    fn bindings_for_device(&self, device_id: &DeviceId) -> Vec<ItemBinding>;
}

impl<T: BindingStore> BindingStore for std::sync::Arc<T> {
    fn resolve_item(&self, item_id: &ItemId) -> Option<ItemBinding> {
        (**self).resolve_item(item_id)
    }

    fn bindings_for_device(&self, device_id: &DeviceId) -> Vec<ItemBinding> {
        (**self).bindings_for_device(device_id)
    }
}
