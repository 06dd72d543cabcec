//! In-memory cache of Spoolman entities.
//!
//! This module provides `SpoolCache`, an immutable snapshot holding one
//! id-keyed arena per entity type, and `CacheBuilder`, which assembles the
//! next snapshot in dependency order:
//! - Vendors first (no outgoing references)
//! - Filaments, each resolving its vendor id
//! - Spools, each resolving its filament id
//!
//! A snapshot is never mutated after it is built; refreshes build a new one.

pub mod snapshot;

pub use snapshot::{CacheBuilder, SpoolCache, SpoolView};
