use anyhow::{Context, Result};
use std::path::Path;

use yoyaku::config::Config;
use yoyaku::crawler::fetcher::decode_bytes;
use yoyaku::parser::extract_slots;
use yoyaku::sources::{FileInputs, InputSource};

/// Parse the configured wish list and print what it resolves to
pub async fn check_wishlist(config: Config) -> Result<()> {
    let inputs = FileInputs::new(config.inputs.clone());
    let wishes = inputs.wish_list().with_context(|| {
        format!(
            "Failed to load wish list: {}",
            config.inputs.wish_list_path.display()
        )
    })?;

    println!("Wish list: {}", config.inputs.wish_list_path.display());
    println!("================================");
    for wish in &wishes {
        println!(
            "  {} {:<15} {:<28} quota={:<3} last_minute={}",
            wish.date,
            wish.band.to_string(),
            format!("{} ({})", wish.area_selector, wish.area().id()),
            wish.quota,
            wish.allow_last_minute
        );
    }
    println!("{} entries", wishes.len());
    Ok(())
}

/// Run the slot extractor on a saved facility table page
pub async fn parse_table(file: &Path, date: &str) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let html = decode_bytes(&bytes, "").context("Failed to decode page")?;

    let entries = extract_slots(&html, date);
    println!("{} facilities on {date}", entries.len());
    for entry in &entries {
        println!("  {} [{}]", entry.facility_name, entry.area().id());
        for slot in &entry.slots {
            println!(
                "    {} {:<15} {}{}",
                slot.clock_time,
                slot.band.to_string(),
                if slot.is_open { "open" } else { "closed" },
                slot.action_ref
                    .as_deref()
                    .map(|r| format!(" -> {r}"))
                    .unwrap_or_default()
            );
        }
    }
    Ok(())
}
