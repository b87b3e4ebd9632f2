//! Config validation command

use anyhow::{Context, Result};
use kiln_asset::MaterialLibrary;
use kiln_runtime::AppConfig;

pub fn run(path: &str) -> Result<()> {
    let config =
        AppConfig::load_from_file(path).with_context(|| format!("Invalid config: {}", path))?;

    MaterialLibrary::with_texture_slots(&config.resolver.texture_slots)
        .with_context(|| format!("Invalid [resolver] section in {}", path))?;

    println!("{} is valid", path);
    println!(
        "  time:   scale={} max_delta={}s units_per_second={}",
        config.time.time_scale, config.time.max_delta_time, config.time.units_per_second
    );
    println!(
        "  render: auto_render={} batching={} bake_lightmaps_on_start={}",
        config.render.auto_render, config.render.batching, config.render.bake_lightmaps_on_start
    );
    match &config.logging.filter {
        Some(filter) => println!("  log:    {}", filter),
        None => println!("  log:    (RUST_LOG)"),
    }

    if config.resolver.texture_slots.is_empty() {
        println!("  slots:  standard only");
    } else {
        println!("  slots:");
        for slot in &config.resolver.texture_slots {
            let placeholder = slot
                .placeholder
                .map(|p| format!("{:?}", p))
                .unwrap_or_else(|| "-".to_string());
            println!("    {} (placeholder: {})", slot.name, placeholder);
        }
    }

    Ok(())
}
