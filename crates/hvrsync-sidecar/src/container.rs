//! Metadata container abstraction
//!
//! The sync logic only needs a handful of operations on the sidecar's
//! metadata model: existence checks, simple properties and fields of
//! struct-valued properties, each addressed by namespace URI and name.
//! [`MetadataContainer`] captures exactly that, so a full XMP toolkit can
//! be plugged in. [`PropertyStore`] is the built-in implementation and
//! persists as a JSON document keyed by namespace URI.

use crate::{Result, SidecarError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Namespace URIs used by the sync
pub mod ns {
    /// XMP basic schema (`xmp:`)
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dynamic media schema (`xmpDM:`)
    pub const DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
    /// Dimensions struct fields (`stDim:`)
    pub const DIMENSIONS: &str = "http://ns.adobe.com/xap/1.0/sType/Dimensions#";
}

/// Metadata model the sync reads from and writes to
pub trait MetadataContainer: Default {
    /// Parse serialized metadata
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Serialize for persisting
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Whether a property exists in any form
    fn has_property(&self, ns: &str, name: &str) -> bool;

    /// Value of a simple property
    fn property(&self, ns: &str, name: &str) -> Option<&str>;

    /// Set a simple property
    ///
    /// An existing struct value is only replaced when `delete_existing` is
    /// set; otherwise it is an error.
    fn set_property(&mut self, ns: &str, name: &str, value: &str, delete_existing: bool)
    -> Result<()>;

    /// Remove a property in whatever form it has
    fn delete_property(&mut self, ns: &str, name: &str);

    /// Value of one field of a struct property
    fn struct_field(&self, ns: &str, name: &str, field_ns: &str, field: &str) -> Option<&str>;

    /// Set one field of a struct property, creating the struct if needed
    fn set_struct_field(
        &mut self,
        ns: &str,
        name: &str,
        field_ns: &str,
        field: &str,
        value: &str,
    ) -> Result<()>;

    /// Remove one field of a struct property
    ///
    /// The struct itself is removed once its last field is gone.
    fn delete_struct_field(&mut self, ns: &str, name: &str, field_ns: &str, field: &str);
}

/// A property value: simple text or a struct of namespaced fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Simple text value
    Simple(String),
    /// Struct fields, keyed by field namespace URI then field name
    Struct(BTreeMap<String, BTreeMap<String, String>>),
}

/// Built-in metadata container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyStore {
    properties: BTreeMap<String, BTreeMap<String, PropertyValue>>,
}

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of a property
    pub fn get(&self, ns: &str, name: &str) -> Option<&PropertyValue> {
        self.properties.get(ns)?.get(name)
    }

    /// Remove a property
    pub fn remove(&mut self, ns: &str, name: &str) -> Option<PropertyValue> {
        let schema = self.properties.get_mut(ns)?;
        let removed = schema.remove(name);
        if schema.is_empty() {
            self.properties.remove(ns);
        }
        removed
    }

    /// Number of properties across all namespaces
    pub fn len(&self) -> usize {
        self.properties.values().map(BTreeMap::len).sum()
    }

    /// Whether the store holds no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl MetadataContainer for PropertyStore {
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
            .map_err(|e| SidecarError::Container(format!("invalid metadata document: {e}")))
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| SidecarError::Container(format!("cannot serialize metadata: {e}")))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn has_property(&self, ns: &str, name: &str) -> bool {
        self.get(ns, name).is_some()
    }

    fn property(&self, ns: &str, name: &str) -> Option<&str> {
        match self.get(ns, name)? {
            PropertyValue::Simple(value) => Some(value.as_str()),
            PropertyValue::Struct(_) => None,
        }
    }

    fn set_property(
        &mut self,
        ns: &str,
        name: &str,
        value: &str,
        delete_existing: bool,
    ) -> Result<()> {
        if !delete_existing && matches!(self.get(ns, name), Some(PropertyValue::Struct(_))) {
            return Err(SidecarError::Container(format!(
                "{name} is a struct, not a simple property"
            )));
        }
        self.properties
            .entry(ns.to_string())
            .or_default()
            .insert(name.to_string(), PropertyValue::Simple(value.to_string()));
        Ok(())
    }

    fn delete_property(&mut self, ns: &str, name: &str) {
        self.remove(ns, name);
    }

    fn struct_field(&self, ns: &str, name: &str, field_ns: &str, field: &str) -> Option<&str> {
        match self.get(ns, name)? {
            PropertyValue::Struct(fields) => fields.get(field_ns)?.get(field).map(String::as_str),
            PropertyValue::Simple(_) => None,
        }
    }

    fn set_struct_field(
        &mut self,
        ns: &str,
        name: &str,
        field_ns: &str,
        field: &str,
        value: &str,
    ) -> Result<()> {
        let slot = self
            .properties
            .entry(ns.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert_with(|| PropertyValue::Struct(BTreeMap::new()));

        match slot {
            PropertyValue::Struct(fields) => {
                fields
                    .entry(field_ns.to_string())
                    .or_default()
                    .insert(field.to_string(), value.to_string());
                Ok(())
            }
            PropertyValue::Simple(_) => Err(SidecarError::Container(format!(
                "{name} is a simple property, not a struct"
            ))),
        }
    }

    fn delete_struct_field(&mut self, ns: &str, name: &str, field_ns: &str, field: &str) {
        let now_empty = match self.properties.get_mut(ns).and_then(|s| s.get_mut(name)) {
            Some(PropertyValue::Struct(fields)) => {
                if let Some(group) = fields.get_mut(field_ns) {
                    group.remove(field);
                    if group.is_empty() {
                        fields.remove(field_ns);
                    }
                }
                fields.is_empty()
            }
            _ => false,
        };
        if now_empty {
            self.remove(ns, name);
        }
    }
}
