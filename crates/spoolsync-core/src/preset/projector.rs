//! Projection of spool data onto preset configuration.
//!
//! The keys are split in two groups. Filament keys describe the material and
//! are written only in `ProjectionMode::Full`. Statistics keys are the spool's
//! consumption counters and are written in both modes. Nothing outside these
//! groups is ever written by an update; absent optional values are skipped
//! rather than zeroed.

use crate::cache::SpoolView;
use crate::models::{Filament, Spool, Vendor};

use super::config::PresetConfig;

pub const KEY_VENDOR: &str = "filament_vendor";
pub const KEY_MATERIAL: &str = "filament_type";
pub const KEY_PRICE: &str = "filament_cost";
pub const KEY_DENSITY: &str = "filament_density";
pub const KEY_DIAMETER: &str = "filament_diameter";
pub const KEY_EXTRUDER_TEMP: &str = "nozzle_temperature";
pub const KEY_BED_TEMP: &str = "hot_plate_temp";
pub const KEY_COLOR: &str = "default_filament_colour";

pub const KEY_REMAINING_WEIGHT: &str = "spoolman_remaining_weight";
pub const KEY_USED_WEIGHT: &str = "spoolman_used_weight";
pub const KEY_REMAINING_LENGTH: &str = "spoolman_remaining_length";
pub const KEY_USED_LENGTH: &str = "spoolman_used_length";

/// Links a preset to the spool it was created from
pub const KEY_SPOOL_ID: &str = "spoolman_spool_id";

pub const FILAMENT_KEYS: [&str; 8] = [
    KEY_VENDOR,
    KEY_MATERIAL,
    KEY_PRICE,
    KEY_DENSITY,
    KEY_DIAMETER,
    KEY_EXTRUDER_TEMP,
    KEY_BED_TEMP,
    KEY_COLOR,
];

pub const STATISTICS_KEYS: [&str; 4] = [
    KEY_REMAINING_WEIGHT,
    KEY_USED_WEIGHT,
    KEY_REMAINING_LENGTH,
    KEY_USED_LENGTH,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Filament, vendor and statistics keys
    Full,
    /// Consumption counters only
    StatisticsOnly,
}

impl ProjectionMode {
    pub fn from_statistics_flag(only_update_statistics: bool) -> Self {
        if only_update_statistics {
            ProjectionMode::StatisticsOnly
        } else {
            ProjectionMode::Full
        }
    }

    /// Every key this mode may write
    pub fn writable_keys(self) -> Vec<&'static str> {
        match self {
            ProjectionMode::Full => FILAMENT_KEYS.iter().chain(&STATISTICS_KEYS).copied().collect(),
            ProjectionMode::StatisticsOnly => STATISTICS_KEYS.to_vec(),
        }
    }
}

pub fn apply_vendor(vendor: &Vendor, config: &mut PresetConfig) {
    config.set(KEY_VENDOR, vendor.name.as_str());
}

pub fn apply_filament(filament: &Filament, config: &mut PresetConfig) {
    config.set(KEY_MATERIAL, filament.material.as_str());
    config.set(KEY_DENSITY, filament.density);
    config.set(KEY_DIAMETER, filament.diameter);
    if let Some(price) = filament.price {
        config.set(KEY_PRICE, price);
    }
    if let Some(temp) = filament.extruder_temp {
        config.set(KEY_EXTRUDER_TEMP, temp);
    }
    if let Some(temp) = filament.bed_temp {
        config.set(KEY_BED_TEMP, temp);
    }
    if let Some(color) = filament.color.as_deref().and_then(normalize_color) {
        config.set(KEY_COLOR, color);
    }
}

pub fn apply_statistics(spool: &Spool, config: &mut PresetConfig) {
    config.set(KEY_USED_WEIGHT, spool.used_weight);
    config.set(KEY_USED_LENGTH, spool.used_length);
    if let Some(remaining) = spool.remaining_weight {
        config.set(KEY_REMAINING_WEIGHT, remaining);
    }
    if let Some(remaining) = spool.remaining_length {
        config.set(KEY_REMAINING_LENGTH, remaining);
    }
}

/// Write `view` onto `config` according to `mode`
pub fn project(view: &SpoolView<'_>, mode: ProjectionMode, config: &mut PresetConfig) {
    if mode == ProjectionMode::Full {
        apply_filament(view.filament, config);
        apply_vendor(view.vendor, config);
    }
    apply_statistics(view.spool, config);
}

/// Name for a preset created from `view`, e.g. `"Acme PLA Basic"`
pub fn preset_name(view: &SpoolView<'_>) -> String {
    format!("{} {}", view.vendor.name.trim(), view.filament.display_name().trim())
        .trim()
        .to_string()
}

/// Spool id a preset is linked to, if any
pub fn linked_spool_id(config: &PresetConfig) -> Option<i64> {
    config.get_int(KEY_SPOOL_ID).filter(|id| *id > 0)
}

/// `"1a1a1a"` / `"#1A1A1A"` -> `"#1A1A1A"`. Returns `None` for anything that
/// is not 6 or 8 hex digits.
fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SpoolCache;
    use crate::preset::ConfigValue;
    use crate::test_support::{acme_filaments, acme_spools, acme_vendors};

    fn acme_cache() -> SpoolCache {
        SpoolCache::from_lists(&acme_vendors(), &acme_filaments(), &acme_spools())
            .expect("fixture builds")
    }

    fn user_config() -> PresetConfig {
        [
            (KEY_MATERIAL, ConfigValue::from("PETG")),
            (KEY_VENDOR, ConfigValue::from("Old Vendor")),
            (KEY_PRICE, ConfigValue::from(19.0)),
            (KEY_EXTRUDER_TEMP, ConfigValue::from(235)),
            (KEY_USED_WEIGHT, ConfigValue::from(1.0)),
            ("filament_max_volumetric_speed", ConfigValue::from(12.0)),
            ("compatible_printers", ConfigValue::from("X1C")),
            (KEY_SPOOL_ID, ConfigValue::from(100i64)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_full_projection() {
        let cache = acme_cache();
        let view = cache.resolve(100).unwrap();
        let mut config = PresetConfig::new();
        project(&view, ProjectionMode::Full, &mut config);

        assert_eq!(config.get_str(KEY_VENDOR), Some("Acme"));
        assert_eq!(config.get_str(KEY_MATERIAL), Some("PLA"));
        assert_eq!(config.get(KEY_PRICE), Some(&ConfigValue::Float(24.99)));
        assert_eq!(config.get(KEY_DENSITY), Some(&ConfigValue::Float(1.24)));
        assert_eq!(config.get(KEY_DIAMETER), Some(&ConfigValue::Float(1.75)));
        assert_eq!(config.get_int(KEY_EXTRUDER_TEMP), Some(210));
        assert_eq!(config.get_int(KEY_BED_TEMP), Some(60));
        assert_eq!(config.get_str(KEY_COLOR), Some("#1A1A1A"));
        assert_eq!(config.get(KEY_REMAINING_WEIGHT), Some(&ConfigValue::Float(900.0)));
        assert_eq!(config.get(KEY_USED_WEIGHT), Some(&ConfigValue::Float(100.0)));
        assert_eq!(config.get(KEY_USED_LENGTH), Some(&ConfigValue::Float(33470.1)));
    }

    #[test]
    fn test_statistics_only_touches_counters() {
        let cache = acme_cache();
        let view = cache.resolve(100).unwrap();
        let before = user_config();
        let mut after = before.clone();
        project(&view, ProjectionMode::StatisticsOnly, &mut after);

        for (key, value) in before.iter() {
            if !STATISTICS_KEYS.contains(&key.as_str()) {
                assert_eq!(after.get(key), Some(value), "key {} changed", key);
            }
        }
        for (key, _) in after.iter() {
            assert!(
                before.contains_key(key) || STATISTICS_KEYS.contains(&key.as_str()),
                "unexpected key {}",
                key
            );
        }
        assert_eq!(after.get(KEY_USED_WEIGHT), Some(&ConfigValue::Float(100.0)));
        assert_eq!(after.get(KEY_REMAINING_WEIGHT), Some(&ConfigValue::Float(900.0)));
    }

    #[test]
    fn test_full_projection_stays_within_writable_keys() {
        let cache = acme_cache();
        for spool_id in cache.spools().keys() {
            let view = cache.resolve(*spool_id).unwrap();
            let mut config = PresetConfig::new();
            project(&view, ProjectionMode::Full, &mut config);
            let allowed = ProjectionMode::Full.writable_keys();
            for (key, _) in config.iter() {
                assert!(allowed.contains(&key.as_str()), "unexpected key {}", key);
            }
        }
    }

    #[test]
    fn test_absent_optionals_are_not_zeroed() {
        let cache = acme_cache();
        // Spool 101 has no remaining_length; filament 10 is fully populated
        let view = cache.resolve(101).unwrap();
        let mut config = user_config();
        config.set(KEY_REMAINING_LENGTH, 5000.0);
        project(&view, ProjectionMode::StatisticsOnly, &mut config);
        assert_eq!(config.get(KEY_REMAINING_LENGTH), Some(&ConfigValue::Float(5000.0)));

        // Filament 11 has a null price and no temperatures
        let mut builder = crate::cache::CacheBuilder::from_snapshot(&cache);
        builder
            .insert_spool(Spool {
                id: 200,
                filament_id: 11,
                remaining_weight: None,
                used_weight: 0.0,
                remaining_length: None,
                used_length: 0.0,
                archived: false,
            })
            .unwrap();
        let cache = builder.build();
        let view = cache.resolve(200).unwrap();
        let mut config = user_config();
        project(&view, ProjectionMode::Full, &mut config);
        assert_eq!(config.get(KEY_PRICE), Some(&ConfigValue::Float(19.0)));
        assert_eq!(config.get_int(KEY_EXTRUDER_TEMP), Some(235));
        assert_eq!(config.get_str(KEY_MATERIAL), Some("PETG"));
        assert_eq!(config.get_str(KEY_VENDOR), Some("Acme"));
    }

    #[test]
    fn test_preset_name() {
        let cache = acme_cache();
        assert_eq!(preset_name(&cache.resolve(100).unwrap()), "Acme PLA Basic");
        assert_eq!(preset_name(&cache.resolve(102).unwrap()), "Polymaker PolyLite ABS");
    }

    #[test]
    fn test_linked_spool_id() {
        let mut config = PresetConfig::new();
        assert_eq!(linked_spool_id(&config), None);
        config.set(KEY_SPOOL_ID, 0i64);
        assert_eq!(linked_spool_id(&config), None);
        config.set(KEY_SPOOL_ID, 100i64);
        assert_eq!(linked_spool_id(&config), Some(100));
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("1a1a1a").as_deref(), Some("#1A1A1A"));
        assert_eq!(normalize_color("#F0F0F0").as_deref(), Some("#F0F0F0"));
        assert_eq!(normalize_color("FF000080").as_deref(), Some("#FF000080"));
        assert_eq!(normalize_color("red"), None);
        assert_eq!(normalize_color(""), None);
    }
}
