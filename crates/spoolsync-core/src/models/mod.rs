//! Data models for Spoolman entities.
//!
//! This module contains the three entity types the sync layer caches:
//!
//! - `Vendor`: the manufacturer of a filament
//! - `Filament`: a material specification, referencing one `Vendor` by id
//! - `Spool`: a physical spool with consumption counters, referencing one
//!   `Filament` by id
//!
//! Each entity has a matching `*Response` struct mirroring the wire format.
//! Conversion from the wire struct checks required fields; reference
//! resolution happens later, in `cache::CacheBuilder`.

pub mod filament;
pub mod spool;
pub mod vendor;

pub use filament::{Filament, FilamentResponse};
pub use spool::{Spool, SpoolResponse};
pub use vendor::{Vendor, VendorResponse};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SpoolmanError, SpoolmanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Vendor,
    Filament,
    Spool,
}

impl EntityKind {
    /// List endpoint for this entity type, relative to the API root
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendor",
            EntityKind::Filament => "filament",
            EntityKind::Spool => "spool",
        }
    }

    /// Single-entity endpoint for `id`
    pub fn item_endpoint(self, id: i64) -> String {
        format!("{}/{}", self.endpoint(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Nested parent object; only the id is used to resolve the reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdRef {
    pub id: Option<i64>,
}

/// Deserialize one wire object, attributing failures to `entity`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    entity: EntityKind,
    value: &Value,
) -> SpoolmanResult<T> {
    T::deserialize(value).map_err(|e| {
        let id = value.get("id").and_then(Value::as_i64);
        SpoolmanError::parse(entity, id, e.to_string())
    })
}

/// Unwrap a required wire field.
pub(crate) fn required<T>(
    value: Option<T>,
    entity: EntityKind,
    id: Option<i64>,
    field: &'static str,
) -> SpoolmanResult<T> {
    value.ok_or(SpoolmanError::MissingField { entity, id, field })
}

/// Iterate the objects of a list endpoint response.
pub(crate) fn list_items(entity: EntityKind, value: &Value) -> SpoolmanResult<&Vec<Value>> {
    value.as_array().ok_or_else(|| {
        SpoolmanError::parse(
            entity,
            None,
            format!("expected a JSON array from '{}'", entity.endpoint()),
        )
    })
}
