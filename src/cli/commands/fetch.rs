use super::record_service;
use crate::config::Config;
use crate::services::RecordError;

pub async fn cmd_fetch(config: &Config, location: &str, date_range: &str) -> anyhow::Result<()> {
    match record_service(config).await?.submit(location, date_range).await {
        Ok(record) => {
            println!(
                "✓ Saved weather for {} [{}] (ID: {})",
                record.location, record.date_range, record.id
            );
            println!("View it with: weatherlog show {}", record.id);
            Ok(())
        }
        Err(e @ (RecordError::Validation(_) | RecordError::Provider { .. })) => {
            println!("{e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
