//! Item bindings: the association between an item and one device attribute.
//!
//! Bindings are declared with a compact property syntax:
//!
//! ```text
//! uid=zone2, bindingType=volumePercent
//! ```
//!
//! `uid` is optional and falls back to [`DeviceId::DEFAULT`]. `bindingType`
//! is required and must name an [`AttributeKind`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeKind;
use crate::error::ConfigurationError;
use crate::id::{DeviceId, ItemId};

/// Property naming the bound device.
pub const KEY_DEVICE_UID: &str = "uid";
/// Property naming the bound attribute.
pub const KEY_BINDING_TYPE: &str = "bindingType";

/// An `(item, device, attribute)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemBinding {
    pub item_id: ItemId,
    pub device_id: DeviceId,
    pub kind: AttributeKind,
}

impl ItemBinding {
    #[must_use]
    pub fn new(item_id: ItemId, device_id: DeviceId, kind: AttributeKind) -> Self {
        Self {
            item_id,
            device_id,
            kind,
        }
    }

    /// Parse a binding declaration for `item_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MalformedBinding`] when a token is not a
    /// `key=value` pair, [`ConfigurationError::MissingProperty`] when
    /// `bindingType` is absent, and [`ConfigurationError::InvalidAttributeKind`]
    /// when it names no known attribute.
    pub fn parse(item_id: ItemId, declaration: &str) -> Result<Self, ConfigurationError> {
        let props = parse_properties(declaration)?;
        let kind = props
            .get(KEY_BINDING_TYPE)
            .ok_or(ConfigurationError::MissingProperty(KEY_BINDING_TYPE))?
            .parse()?;
        let device_id = props
            .get(KEY_DEVICE_UID)
            .map_or_else(DeviceId::default, |uid| DeviceId::new(*uid));

        Ok(Self::new(item_id, device_id, kind))
    }
}

fn parse_properties(declaration: &str) -> Result<HashMap<&str, &str>, ConfigurationError> {
    let mut props = HashMap::new();
    for token in declaration.trim().split(',') {
        let token = token.trim();
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| ConfigurationError::MalformedBinding(declaration.to_string()))?;
        props.insert(key.trim(), value.trim());
    }
    Ok(props)
}
