//! List records command handler

use super::record_service;
use crate::config::Config;

pub async fn cmd_list_records(config: &Config) -> anyhow::Result<()> {
    let records = record_service(config).await?.list().await?;

    if records.is_empty() {
        println!("No saved records.");
        println!();
        println!("Add one with: weatherlog fetch \"Boston\" \"2024-06-01\"");
        return Ok(());
    }

    println!("Saved records ({} total)", records.len());
    println!("{:-<70}", "");

    for record in records {
        let temperature = record
            .payload()
            .ok()
            .and_then(|p| p.current_conditions().temperature)
            .map_or_else(|| "?".to_string(), |t| format!("{t:.1}°C"));

        println!(
            "{:>4}  {} [{}]  {}",
            record.id, record.location, record.date_range, temperature
        );
    }

    Ok(())
}
