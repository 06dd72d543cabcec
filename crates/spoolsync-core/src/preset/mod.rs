//! Filament presets and the projection of spool data onto them.
//!
//! - `PresetConfig`: ordered key/value configuration of one preset
//! - `Preset`, `PresetCollection`: named presets, unique by name
//! - `projector`: writes vendor/filament/spool attributes onto a config

pub mod config;
pub mod projector;

pub use config::{ConfigValue, Preset, PresetCollection, PresetConfig};
pub use projector::ProjectionMode;
