//! spoolsync-core - Spoolman inventory sync and filament preset projection.
//!
//! This crate pulls vendors, filaments and spools from a Spoolman server,
//! keeps them in an immutable id-keyed snapshot, and projects spool data onto
//! filament preset configuration.
//!
//! ```no_run
//! # async fn demo() -> spoolsync_core::SpoolmanResult<()> {
//! use spoolsync_core::Spoolman;
//!
//! let spoolman = Spoolman::instance()?;
//! let snapshot = spoolman.get_spools(false).await?;
//! for spool in snapshot.spools().values() {
//!     println!("{} {:?}", spool.id, spool.remaining_weight);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod preset;
pub mod spoolman;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiError, HttpTransport, SpoolmanTransport};
pub use cache::{CacheBuilder, SpoolCache, SpoolView};
pub use config::Config;
pub use error::{ErrorKind, SpoolmanError, SpoolmanResult};
pub use models::{EntityKind, Filament, Spool, Vendor};
pub use preset::{ConfigValue, Preset, PresetCollection, PresetConfig, ProjectionMode};
pub use spoolman::Spoolman;
