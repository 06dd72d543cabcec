use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::SpoolCache;
use crate::error::SpoolmanResult;
use crate::spoolman::Spoolman;

use super::{decode, required, EntityKind, Filament, IdRef, Vendor};

/// Wire shape of `/spool` items
#[derive(Debug, Clone, Deserialize)]
pub struct SpoolResponse {
    pub id: Option<i64>,
    pub filament: Option<IdRef>,
    pub remaining_weight: Option<f64>,
    pub used_weight: Option<f64>,
    pub remaining_length: Option<f64>,
    pub used_length: Option<f64>,
    pub archived: Option<bool>,
}

impl SpoolResponse {
    pub fn to_spool(&self) -> SpoolmanResult<Spool> {
        let id = required(self.id, EntityKind::Spool, None, "id")?;
        let filament_id = required(
            self.filament.as_ref().and_then(|f| f.id),
            EntityKind::Spool,
            Some(id),
            "filament.id",
        )?;

        Ok(Spool {
            id,
            filament_id,
            remaining_weight: self.remaining_weight,
            used_weight: self.used_weight.unwrap_or_default(),
            remaining_length: self.remaining_length,
            used_length: self.used_length.unwrap_or_default(),
            archived: self.archived.unwrap_or(false),
        })
    }
}

/// A physical spool of filament.
///
/// `remaining_*` is unknown when the spool was registered without an
/// initial weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spool {
    pub id: i64,
    pub filament_id: i64,
    pub remaining_weight: Option<f64>,
    pub used_weight: f64,
    pub remaining_length: Option<f64>,
    pub used_length: f64,
    pub archived: bool,
}

impl Spool {
    pub fn from_json(value: &Value) -> SpoolmanResult<Self> {
        decode::<SpoolResponse>(EntityKind::Spool, value)?.to_spool()
    }

    pub fn filament<'a>(&self, cache: &'a SpoolCache) -> Option<&'a Filament> {
        cache.filament(self.filament_id)
    }

    pub fn vendor<'a>(&self, cache: &'a SpoolCache) -> Option<&'a Vendor> {
        self.filament(cache).and_then(|f| f.vendor(cache))
    }

    /// Re-fetch this spool (and with `recursive`, its filament and vendor).
    pub async fn update_from_server(
        &self,
        spoolman: &Spoolman,
        recursive: bool,
    ) -> SpoolmanResult<Spool> {
        spoolman.refresh_spool(self.id, recursive).await
    }
}
