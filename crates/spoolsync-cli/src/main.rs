//! spoolsync - inspect a Spoolman inventory and preview filament presets.
//!
//! Usage:
//!   spoolsync list [--refresh]
//!   spoolsync show <spool-id>
//!   spoolsync refresh <spool-id> [--recursive]
//!   spoolsync preset <spool-id>

use std::io;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spoolsync_core::{Preset, PresetCollection, PresetConfig, SpoolCache, Spoolman};

const USAGE: &str = "Usage:
  spoolsync list [--refresh]              List cached spools (pull first with --refresh)
  spoolsync show <spool-id>               Show one spool with its filament and vendor
  spoolsync refresh <spool-id> [--recursive]
                                          Re-fetch one spool (and its filament/vendor)
  spoolsync preset <spool-id>             Print the preset a spool would produce

Environment:
  SPOOLMAN_HOST          Spoolman base URL (default http://localhost:7912)
  SPOOLMAN_TIMEOUT_SECS  Request timeout in seconds
  RUST_LOG               Log filter (default warn)";

/// Base profile used when previewing a preset
const PREVIEW_BASE_PROFILE: &str = "Generic Filament";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let has_flag = |flag: &str| args.iter().any(|a| a == flag);

    let spoolman = Spoolman::instance()?;
    info!(command = ?args.first(), "spoolsync starting");

    match args.first().map(String::as_str) {
        Some("list") => list(spoolman, has_flag("--refresh")).await,
        Some("show") => show(spoolman, parse_id(&args)?).await,
        Some("refresh") => refresh(spoolman, parse_id(&args)?, has_flag("--recursive")).await,
        Some("preset") => preview_preset(spoolman, parse_id(&args)?).await,
        Some("-h") | Some("--help") | None => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn parse_id(args: &[String]) -> Result<i64> {
    let raw = args
        .get(1)
        .with_context(|| format!("Missing spool id\n\n{}", USAGE))?;
    raw.parse()
        .with_context(|| format!("Invalid spool id '{}'", raw))
}

async fn list(spoolman: &Spoolman, force_refresh: bool) -> Result<()> {
    let snapshot = spoolman.get_spools(force_refresh).await?;

    println!(
        "{:>6}  {:<32}  {:<8}  {:>10}  {:>10}",
        "ID", "FILAMENT", "MATERIAL", "REMAINING", "USED"
    );
    for spool in snapshot.spools().values() {
        let view = snapshot.resolve(spool.id)?;
        let label = format!("{} {}", view.vendor.name, view.filament.display_name());
        println!(
            "{:>6}  {:<32}  {:<8}  {:>10}  {:>9.1}g{}",
            spool.id,
            label,
            view.filament.material,
            format_weight(spool.remaining_weight),
            spool.used_weight,
            if spool.archived { "  (archived)" } else { "" }
        );
    }
    println!("\n{} spools, pulled {}", snapshot.spools().len(), snapshot.age_display());
    Ok(())
}

async fn show(spoolman: &Spoolman, id: i64) -> Result<()> {
    let spool = spoolman.get_spool_by_id(id, false).await?;
    let snapshot = spoolman
        .snapshot()
        .context("Spool cache is not initialized")?;
    print_spool(&snapshot, spool.id)
}

async fn refresh(spoolman: &Spoolman, id: i64, recursive: bool) -> Result<()> {
    let spool = spoolman.refresh_spool(id, recursive).await?;
    let snapshot = spoolman
        .snapshot()
        .context("Spool cache is not initialized")?;
    print_spool(&snapshot, spool.id)
}

async fn preview_preset(spoolman: &Spoolman, id: i64) -> Result<()> {
    let spool = spoolman.get_spool_by_id(id, false).await?;
    let base = Preset::new(PREVIEW_BASE_PROFILE, PresetConfig::new());
    let mut presets = PresetCollection::new();

    let name = spoolman
        .create_filament_preset_from_spool(&spool, &base, &mut presets)
        .await?;
    let preset = presets
        .get(&name)
        .with_context(|| format!("Preset '{}' was not stored", name))?;

    println!("{}", serde_json::to_string_pretty(preset)?);
    Ok(())
}

fn print_spool(snapshot: &SpoolCache, id: i64) -> Result<()> {
    let view = snapshot.resolve(id)?;
    let filament = view.filament;

    println!("Spool {}{}", view.spool.id, if view.spool.archived { " (archived)" } else { "" });
    println!("  Vendor:      {} (#{})", view.vendor.name, view.vendor.id);
    println!("  Filament:    {} (#{})", filament.display_name(), filament.id);
    println!("  Material:    {}", filament.material);
    println!("  Diameter:    {} mm", filament.diameter);
    println!("  Density:     {} g/cm3", filament.density);
    if let Some(price) = filament.price {
        println!("  Price:       {:.2}", price);
    }
    if let Some(temp) = filament.extruder_temp {
        println!("  Extruder:    {} C", temp);
    }
    if let Some(temp) = filament.bed_temp {
        println!("  Bed:         {} C", temp);
    }
    if let Some(ref color) = filament.color {
        println!("  Color:       {}", color);
    }
    println!("  Remaining:   {}", format_weight(view.spool.remaining_weight));
    println!("  Used:        {:.1}g / {:.1}mm", view.spool.used_weight, view.spool.used_length);
    Ok(())
}

fn format_weight(weight: Option<f64>) -> String {
    match weight {
        Some(w) => format!("{:.1}g", w),
        None => "unknown".to_string(),
    }
}
