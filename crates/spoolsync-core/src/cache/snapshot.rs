use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::{SpoolmanError, SpoolmanResult};
use crate::models::{list_items, EntityKind, Filament, Spool, Vendor};

/// Consider a snapshot stale after 1 hour.
const CACHE_STALE_MINUTES: i64 = 60;

/// A fully-resolved spool: the spool plus the filament and vendor it reaches.
#[derive(Debug, Clone, Copy)]
pub struct SpoolView<'a> {
    pub spool: &'a Spool,
    pub filament: &'a Filament,
    pub vendor: &'a Vendor,
}

/// One consistent generation of the three entity arenas.
#[derive(Debug, Clone)]
pub struct SpoolCache {
    vendors: BTreeMap<i64, Vendor>,
    filaments: BTreeMap<i64, Filament>,
    spools: BTreeMap<i64, Spool>,
    pulled_at: DateTime<Utc>,
}

impl SpoolCache {
    /// Build a snapshot from the `vendor`, `filament` and `spool` list
    /// responses, in that order.
    pub fn from_lists(vendors: &Value, filaments: &Value, spools: &Value) -> SpoolmanResult<Self> {
        let mut builder = CacheBuilder::new();

        for item in list_items(EntityKind::Vendor, vendors)? {
            builder.insert_vendor(Vendor::from_json(item)?);
        }
        for item in list_items(EntityKind::Filament, filaments)? {
            builder.insert_filament(Filament::from_json(item)?)?;
        }
        for item in list_items(EntityKind::Spool, spools)? {
            builder.insert_spool(Spool::from_json(item)?)?;
        }

        let cache = builder.build();
        debug!(
            vendors = cache.vendors.len(),
            filaments = cache.filaments.len(),
            spools = cache.spools.len(),
            "Built spool cache"
        );
        Ok(cache)
    }

    pub fn vendors(&self) -> &BTreeMap<i64, Vendor> {
        &self.vendors
    }

    pub fn filaments(&self) -> &BTreeMap<i64, Filament> {
        &self.filaments
    }

    pub fn spools(&self) -> &BTreeMap<i64, Spool> {
        &self.spools
    }

    pub fn vendor(&self, id: i64) -> Option<&Vendor> {
        self.vendors.get(&id)
    }

    pub fn filament(&self, id: i64) -> Option<&Filament> {
        self.filaments.get(&id)
    }

    pub fn spool(&self, id: i64) -> Option<&Spool> {
        self.spools.get(&id)
    }

    /// Resolve a spool and its parent chain
    pub fn resolve(&self, spool_id: i64) -> SpoolmanResult<SpoolView<'_>> {
        let spool = self.spools.get(&spool_id).ok_or(SpoolmanError::NotFound {
            entity: EntityKind::Spool,
            id: spool_id,
        })?;
        self.view_of(spool)
    }

    /// Resolve the parent chain of `spool` against this snapshot. `spool`
    /// need not be the cached copy.
    pub fn view_of<'a>(&'a self, spool: &'a Spool) -> SpoolmanResult<SpoolView<'a>> {
        let filament = self.filaments.get(&spool.filament_id).ok_or(SpoolmanError::Referential {
            entity: EntityKind::Spool,
            id: spool.id,
            parent: EntityKind::Filament,
            parent_id: spool.filament_id,
        })?;
        let vendor = self.vendors.get(&filament.vendor_id).ok_or(SpoolmanError::Referential {
            entity: EntityKind::Filament,
            id: filament.id,
            parent: EntityKind::Vendor,
            parent_id: filament.vendor_id,
        })?;
        Ok(SpoolView {
            spool,
            filament,
            vendor,
        })
    }

    /// Spools that have not been archived
    pub fn active_spools(&self) -> impl Iterator<Item = &Spool> {
        self.spools.values().filter(|s| !s.archived)
    }

    pub fn pulled_at(&self) -> DateTime<Utc> {
        self.pulled_at
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.pulled_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Assembles the next `SpoolCache`, enforcing that every reference points at
/// an entity already inserted.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    vendors: BTreeMap<i64, Vendor>,
    filaments: BTreeMap<i64, Filament>,
    spools: BTreeMap<i64, Spool>,
    pulled_at: DateTime<Utc>,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self {
            vendors: BTreeMap::new(),
            filaments: BTreeMap::new(),
            spools: BTreeMap::new(),
            pulled_at: Utc::now(),
        }
    }

    /// Start from a copy of an existing snapshot, keeping its pull time
    pub fn from_snapshot(cache: &SpoolCache) -> Self {
        Self {
            vendors: cache.vendors.clone(),
            filaments: cache.filaments.clone(),
            spools: cache.spools.clone(),
            pulled_at: cache.pulled_at,
        }
    }

    pub fn insert_vendor(&mut self, vendor: Vendor) {
        self.vendors.insert(vendor.id, vendor);
    }

    pub fn insert_filament(&mut self, filament: Filament) -> SpoolmanResult<()> {
        if !self.vendors.contains_key(&filament.vendor_id) {
            return Err(SpoolmanError::Referential {
                entity: EntityKind::Filament,
                id: filament.id,
                parent: EntityKind::Vendor,
                parent_id: filament.vendor_id,
            });
        }
        self.filaments.insert(filament.id, filament);
        Ok(())
    }

    pub fn insert_spool(&mut self, spool: Spool) -> SpoolmanResult<()> {
        if !self.filaments.contains_key(&spool.filament_id) {
            return Err(SpoolmanError::Referential {
                entity: EntityKind::Spool,
                id: spool.id,
                parent: EntityKind::Filament,
                parent_id: spool.filament_id,
            });
        }
        self.spools.insert(spool.id, spool);
        Ok(())
    }

    pub fn build(self) -> SpoolCache {
        SpoolCache {
            vendors: self.vendors,
            filaments: self.filaments,
            spools: self.spools,
            pulled_at: self.pulled_at,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
