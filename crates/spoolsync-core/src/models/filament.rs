use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::SpoolCache;
use crate::error::SpoolmanResult;
use crate::spoolman::Spoolman;

use super::{decode, required, EntityKind, IdRef, Vendor};

/// Wire shape of `/filament` items.
///
/// Spoolman names the temperature and color fields `settings_extruder_temp`,
/// `settings_bed_temp` and `color_hex`; the short names are accepted too and
/// are used when Spoolman's own field is absent or null.
#[derive(Debug, Clone, Deserialize)]
pub struct FilamentResponse {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub vendor: Option<IdRef>,
    pub material: Option<String>,
    pub price: Option<f64>,
    pub density: Option<f64>,
    pub diameter: Option<f64>,
    pub article_number: Option<String>,
    pub settings_extruder_temp: Option<i32>,
    pub extruder_temp: Option<i32>,
    pub settings_bed_temp: Option<i32>,
    pub bed_temp: Option<i32>,
    pub color_hex: Option<String>,
    pub color: Option<String>,
}

impl FilamentResponse {
    pub fn to_filament(&self) -> SpoolmanResult<Filament> {
        let kind = EntityKind::Filament;
        let id = required(self.id, kind, None, "id")?;
        let vendor_id = required(
            self.vendor.as_ref().and_then(|v| v.id),
            kind,
            Some(id),
            "vendor.id",
        )?;

        Ok(Filament {
            id,
            vendor_id,
            name: self.name.clone().unwrap_or_default(),
            material: required(self.material.clone(), kind, Some(id), "material")?,
            price: self.price,
            density: required(self.density, kind, Some(id), "density")?,
            diameter: required(self.diameter, kind, Some(id), "diameter")?,
            article_number: self.article_number.clone(),
            extruder_temp: self.settings_extruder_temp.or(self.extruder_temp),
            bed_temp: self.settings_bed_temp.or(self.bed_temp),
            color: self.color_hex.clone().or_else(|| self.color.clone()),
        })
    }
}

/// A type of filament. Many spools may share one filament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub material: String,
    pub price: Option<f64>,
    pub density: f64,
    pub diameter: f64,
    pub article_number: Option<String>,
    pub extruder_temp: Option<i32>,
    pub bed_temp: Option<i32>,
    pub color: Option<String>,
}

impl Filament {
    pub fn from_json(value: &Value) -> SpoolmanResult<Self> {
        decode::<FilamentResponse>(EntityKind::Filament, value)?.to_filament()
    }

    /// Resolve the vendor in `cache`
    pub fn vendor<'a>(&self, cache: &'a SpoolCache) -> Option<&'a Vendor> {
        cache.vendor(self.vendor_id)
    }

    /// Name shown to users, falling back to the material when unnamed
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.material
        } else {
            &self.name
        }
    }

    /// Re-fetch this filament (and with `recursive`, its vendor).
    pub async fn update_from_server(
        &self,
        spoolman: &Spoolman,
        recursive: bool,
    ) -> SpoolmanResult<Filament> {
        spoolman.refresh_filament(self.id, recursive).await
    }
}
