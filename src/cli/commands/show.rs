use super::{parse_id, record_service};
use crate::config::Config;
use crate::services::RecordError;

pub async fn cmd_show_record(config: &Config, id_str: &str) -> anyhow::Result<()> {
    let Some(id) = parse_id(id_str) else {
        println!("Invalid record ID: {id_str}");
        println!("Use 'weatherlog list' to see record IDs.");
        return Ok(());
    };

    let view = match record_service(config).await?.view(id).await {
        Ok(view) => view,
        Err(RecordError::NotFound(_)) => {
            println!("Record {id} not found.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let record = &view.record;
    let current = view.payload.current_conditions();

    println!("{} [{}]", record.location, record.date_range);
    println!("  ID: {} | Saved: {}", record.id, record.created_at);
    if let Some(updated) = &record.updated_at {
        println!("  Updated: {updated}");
    }
    println!();

    if let Some(description) = &current.description {
        println!("  Conditions:  {description}");
    }
    if let Some(temp) = current.temperature {
        println!("  Temperature: {temp:.1}°C");
    }
    if let Some(feels_like) = current.feels_like {
        println!("  Feels like:  {feels_like:.1}°C");
    }
    if let Some(humidity) = current.humidity {
        println!("  Humidity:    {humidity}%");
    }
    if let Some(wind) = current.wind_speed {
        println!("  Wind:        {wind} m/s");
    }

    let forecast = view.payload.forecast_entries();
    if !forecast.is_empty() {
        println!();
        println!("  Forecast ({} slots):", forecast.len());
        for entry in forecast.iter().take(8) {
            println!(
                "    {}  {}  {}",
                entry.time.as_deref().unwrap_or("?"),
                entry
                    .temperature
                    .map_or_else(|| "?".to_string(), |t| format!("{t:.1}°C")),
                entry.description.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}
