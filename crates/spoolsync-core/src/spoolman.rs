//! Spoolman sync service.
//!
//! `Spoolman` owns the published `SpoolCache` snapshot and every network
//! round trip that feeds it. Readers clone the current `Arc<SpoolCache>` and
//! keep a consistent graph for as long as they hold it. Pulls and
//! single-entity refreshes build the next snapshot off to the side, are
//! serialized by `sync_lock`, and publish with a single pointer swap. A
//! failed pull or refresh publishes nothing.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, HttpTransport, SpoolmanTransport};
use crate::cache::{CacheBuilder, SpoolCache};
use crate::config::Config;
use crate::error::{SpoolmanError, SpoolmanResult};
use crate::models::{EntityKind, Filament, Spool, Vendor};
use crate::preset::projector::{self, KEY_SPOOL_ID};
use crate::preset::{Preset, PresetCollection, ProjectionMode};

static INSTANCE: OnceLock<Result<Spoolman, String>> = OnceLock::new();

pub struct Spoolman {
    transport: Arc<dyn SpoolmanTransport>,
    cache: RwLock<Option<Arc<SpoolCache>>>,
    sync_lock: Mutex<()>,
}

impl Spoolman {
    pub fn new(transport: Arc<dyn SpoolmanTransport>) -> Self {
        Self {
            transport,
            cache: RwLock::new(None),
            sync_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(HttpTransport::from_config(config)?)))
    }

    /// Process-wide instance, built from `Config::resolve()` on first access.
    /// A client that fails to build stays failed; every call reports it.
    pub fn instance() -> SpoolmanResult<&'static Spoolman> {
        init_once(&INSTANCE, || {
            let config = Config::resolve();
            info!(host = %config.host, "Initializing Spoolman client");
            Self::from_config(&config)
        })
    }

    /// Last published snapshot, without any network activity
    pub fn snapshot(&self) -> Option<Arc<SpoolCache>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True once a pull has succeeded
    pub fn is_initialized(&self) -> bool {
        self.snapshot().is_some()
    }

    fn publish(&self, next: SpoolCache) -> Arc<SpoolCache> {
        let next = Arc::new(next);
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&next));
        next
    }

    async fn fetch(&self, endpoint: &str) -> SpoolmanResult<Value> {
        self.transport.get_json(endpoint).await.map_err(|e| {
            warn!(endpoint, error = %e, "Spoolman request failed");
            SpoolmanError::transport(endpoint, e)
        })
    }

    // ===== Full pull =====

    /// Fetch vendors, filaments and spools and replace the whole cache.
    pub async fn pull(&self) -> SpoolmanResult<Arc<SpoolCache>> {
        let _guard = self.sync_lock.lock().await;
        self.pull_locked().await
    }

    async fn pull_locked(&self) -> SpoolmanResult<Arc<SpoolCache>> {
        info!("Pulling inventory from Spoolman");

        match self.fetch_inventory().await {
            Ok(next) => {
                info!(
                    vendors = next.vendors().len(),
                    filaments = next.filaments().len(),
                    spools = next.spools().len(),
                    "Pull complete"
                );
                Ok(self.publish(next))
            }
            Err(e) => {
                warn!(error = %e, kept_previous = self.is_initialized(), "Pull failed");
                Err(e)
            }
        }
    }

    /// Fetch the three list endpoints and build, without publishing.
    async fn fetch_inventory(&self) -> SpoolmanResult<SpoolCache> {
        let vendors = self.fetch(EntityKind::Vendor.endpoint()).await?;
        let filaments = self.fetch(EntityKind::Filament.endpoint()).await?;
        let spools = self.fetch(EntityKind::Spool.endpoint()).await?;
        SpoolCache::from_lists(&vendors, &filaments, &spools)
    }

    /// Current snapshot, pulling first if nothing has been published yet.
    /// Caller must hold `sync_lock`.
    async fn current_locked(&self) -> SpoolmanResult<Arc<SpoolCache>> {
        match self.snapshot() {
            Some(snapshot) => Ok(snapshot),
            None => self.pull_locked().await,
        }
    }

    // ===== Lookups =====

    /// Current snapshot; pulls first when `force_refresh` is set or the
    /// client has never initialized.
    pub async fn get_spools(&self, force_refresh: bool) -> SpoolmanResult<Arc<SpoolCache>> {
        if !force_refresh {
            if let Some(snapshot) = self.snapshot() {
                return Ok(snapshot);
            }
        }

        let _guard = self.sync_lock.lock().await;
        if force_refresh {
            self.pull_locked().await
        } else {
            // Another caller may have finished the first pull while we waited
            self.current_locked().await
        }
    }

    pub async fn get_spool_by_id(&self, id: i64, force_refresh: bool) -> SpoolmanResult<Spool> {
        let snapshot = self.get_spools(force_refresh).await?;
        snapshot.spool(id).cloned().ok_or(SpoolmanError::NotFound {
            entity: EntityKind::Spool,
            id,
        })
    }

    // ===== Single-entity refresh =====

    pub async fn refresh_vendor(&self, id: i64) -> SpoolmanResult<Vendor> {
        let _guard = self.sync_lock.lock().await;
        let snapshot = self.current_locked().await?;
        let mut builder = CacheBuilder::from_snapshot(&snapshot);
        let vendor = self.stage_vendor(&mut builder, id).await?;
        self.publish(builder.build());
        Ok(vendor)
    }

    pub async fn refresh_filament(&self, id: i64, recursive: bool) -> SpoolmanResult<Filament> {
        let _guard = self.sync_lock.lock().await;
        let snapshot = self.current_locked().await?;
        let mut builder = CacheBuilder::from_snapshot(&snapshot);
        let filament = self.stage_filament(&mut builder, id, recursive).await?;
        self.publish(builder.build());
        Ok(filament)
    }

    pub async fn refresh_spool(&self, id: i64, recursive: bool) -> SpoolmanResult<Spool> {
        let _guard = self.sync_lock.lock().await;
        let (spool, _) = self.refresh_spool_locked(id, recursive).await?;
        Ok(spool)
    }

    async fn refresh_spool_locked(
        &self,
        id: i64,
        recursive: bool,
    ) -> SpoolmanResult<(Spool, Arc<SpoolCache>)> {
        let snapshot = self.current_locked().await?;
        let mut builder = CacheBuilder::from_snapshot(&snapshot);
        let spool = self.stage_spool(&mut builder, id, recursive).await?;
        Ok((spool, self.publish(builder.build())))
    }

    async fn fetch_item(&self, entity: EntityKind, id: i64) -> SpoolmanResult<Value> {
        debug!(%entity, id, "Refreshing entity");
        let endpoint = entity.item_endpoint(id);
        match self.transport.get_json(&endpoint).await {
            Ok(body) => Ok(body),
            Err(ApiError::NotFound(_)) => {
                warn!(%entity, id, "Entity no longer exists on the server");
                Err(SpoolmanError::NotFound { entity, id })
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Spoolman request failed");
                Err(SpoolmanError::transport(endpoint, e))
            }
        }
    }

    async fn stage_vendor(&self, builder: &mut CacheBuilder, id: i64) -> SpoolmanResult<Vendor> {
        let vendor = Vendor::from_json(&self.fetch_item(EntityKind::Vendor, id).await?)?;
        check_identity(EntityKind::Vendor, id, vendor.id)?;
        builder.insert_vendor(vendor.clone());
        Ok(vendor)
    }

    async fn stage_filament(
        &self,
        builder: &mut CacheBuilder,
        id: i64,
        recursive: bool,
    ) -> SpoolmanResult<Filament> {
        let filament = Filament::from_json(&self.fetch_item(EntityKind::Filament, id).await?)?;
        check_identity(EntityKind::Filament, id, filament.id)?;
        if recursive {
            self.stage_vendor(builder, filament.vendor_id).await?;
        }
        builder.insert_filament(filament.clone())?;
        Ok(filament)
    }

    async fn stage_spool(
        &self,
        builder: &mut CacheBuilder,
        id: i64,
        recursive: bool,
    ) -> SpoolmanResult<Spool> {
        let spool = Spool::from_json(&self.fetch_item(EntityKind::Spool, id).await?)?;
        check_identity(EntityKind::Spool, id, spool.id)?;
        if recursive {
            self.stage_filament(builder, spool.filament_id, true).await?;
        }
        builder.insert_spool(spool.clone())?;
        Ok(spool)
    }

    // ===== Presets =====

    /// Create a preset named `"<vendor> <filament>"` from `base_profile`,
    /// overlaid with the spool's full projection and linked to the spool.
    /// Returns the new preset's name.
    pub async fn create_filament_preset_from_spool(
        &self,
        spool: &Spool,
        base_profile: &Preset,
        presets: &mut PresetCollection,
    ) -> SpoolmanResult<String> {
        let snapshot = self.get_spools(false).await?;
        let view = snapshot.view_of(spool)?;

        let name = projector::preset_name(&view);
        if presets.contains(&name) {
            return Err(SpoolmanError::DuplicatePreset { name });
        }

        let mut config = base_profile.config.clone();
        projector::project(&view, ProjectionMode::Full, &mut config);
        config.set(KEY_SPOOL_ID, spool.id);

        let inherits = base_profile
            .inherits
            .clone()
            .unwrap_or_else(|| base_profile.name.clone());
        presets.add(Preset {
            name: name.clone(),
            inherits: Some(inherits),
            config,
        })?;

        info!(preset = %name, spool = spool.id, "Created filament preset from spool");
        Ok(name)
    }

    /// Refresh the spool `preset` is linked to and project it onto the
    /// preset. With `only_update_statistics` only the consumption counters
    /// are refreshed and written.
    pub async fn update_filament_preset_from_spool(
        &self,
        preset: &mut Preset,
        only_update_statistics: bool,
    ) -> SpoolmanResult<()> {
        let spool_id = projector::linked_spool_id(&preset.config).ok_or_else(|| {
            SpoolmanError::NotLinked {
                preset: preset.name.clone(),
            }
        })?;
        let mode = ProjectionMode::from_statistics_flag(only_update_statistics);

        let snapshot = {
            let _guard = self.sync_lock.lock().await;
            let (_, snapshot) = self
                .refresh_spool_locked(spool_id, mode == ProjectionMode::Full)
                .await?;
            snapshot
        };

        let view = snapshot.resolve(spool_id)?;
        projector::project(&view, mode, &mut preset.config);
        debug!(preset = %preset.name, spool = spool_id, ?mode, "Updated filament preset");
        Ok(())
    }
}

fn init_once(
    cell: &OnceLock<Result<Spoolman, String>>,
    build: impl FnOnce() -> Result<Spoolman, ApiError>,
) -> SpoolmanResult<&Spoolman> {
    cell.get_or_init(|| {
        build().map_err(|e| {
            error!(error = %e, "Failed to build Spoolman HTTP client");
            e.to_string()
        })
    })
    .as_ref()
    .map_err(|message| SpoolmanError::ClientInit {
        message: message.clone(),
    })
}

/// The server must answer `entity/{id}` with that entity
fn check_identity(entity: EntityKind, requested: i64, returned: i64) -> SpoolmanResult<()> {
    if requested == returned {
        Ok(())
    } else {
        Err(SpoolmanError::parse(
            entity,
            Some(requested),
            format!("server returned id {}", returned),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
