use super::{parse_id, record_service};
use crate::config::Config;
use crate::services::RecordError;

pub async fn cmd_remove_record(config: &Config, id_str: &str, yes: bool) -> anyhow::Result<()> {
    let Some(id) = parse_id(id_str) else {
        println!("Invalid record ID: {id_str}");
        println!("Use 'weatherlog list' to see record IDs.");
        return Ok(());
    };

    let records = record_service(config).await?;

    let record = match records.get(id).await {
        Ok(record) => record,
        Err(RecordError::NotFound(_)) => {
            println!("Record with ID {id} not found.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if !yes {
        println!(
            "Delete '{}' [{}] (ID: {})?",
            record.location, record.date_range, record.id
        );
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    records.delete(id).await?;
    println!("✓ Record deleted: {}", record.location);

    Ok(())
}
