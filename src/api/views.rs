//! Server-rendered HTML pages.

use axum::http::StatusCode;
use axum::response::Html;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::flash::Flash;
use crate::models::{CurrentConditions, ForecastEntry, WeatherRecord};
use crate::models::record::{MAX_DATE_RANGE_LEN, MAX_LOCATION_LEN};
use crate::services::RecordView;

const MAPS_EMBED_URL: &str = "https://www.google.com/maps/embed/v1/place";

fn layout(title: &str, flashes: &[Flash], body: &str) -> Html<String> {
    let mut messages = String::new();
    for flash in flashes {
        messages.push_str(&format!(
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            text(&flash.message)
        ));
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Weatherlog</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<nav><a href="/">New search</a> <a href="/records">Saved records</a></nav>
<main>
{messages}
{body}
</main>
</body>
</html>
"#,
        title = text(title),
    ))
}

fn record_form(action: &str, location: &str, date_range: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Location <input type="text" name="location" value="{location}" maxlength="{MAX_LOCATION_LEN}" required></label>
<label>Date range <input type="text" name="date_range" value="{date_range}" maxlength="{MAX_DATE_RANGE_LEN}" placeholder="2024-06-01 to 2024-06-05" required></label>
<button type="submit">{submit}</button>
</form>"#,
        action = attr(action),
        location = attr(location),
        date_range = attr(date_range),
        submit = text(submit),
    )
}

fn temperature(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |t| format!("{t:.1} °C"))
}

fn or_blank<T: ToString>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{}{unit}", v.to_string()))
}

pub fn index_page(flashes: &[Flash]) -> Html<String> {
    let body = format!(
        "<h1>Check the weather</h1>\n{}",
        record_form("/", "", "", "Get weather")
    );
    layout("New search", flashes, &body)
}

fn current_section(current: &CurrentConditions) -> String {
    let place = match (&current.city, &current.country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(city), None) => city.clone(),
        _ => String::new(),
    };

    format!(
        r#"<section class="current">
<h2>Current conditions {place}</h2>
<p class="description">{description}</p>
<dl>
<dt>Temperature</dt><dd>{temp}</dd>
<dt>Feels like</dt><dd>{feels_like}</dd>
<dt>Humidity</dt><dd>{humidity}</dd>
<dt>Pressure</dt><dd>{pressure}</dd>
<dt>Wind</dt><dd>{wind}</dd>
</dl>
</section>"#,
        place = text(&place),
        description = text(current.description.as_deref().unwrap_or("")),
        temp = temperature(current.temperature),
        feels_like = temperature(current.feels_like),
        humidity = or_blank(current.humidity, " %"),
        pressure = or_blank(current.pressure, " hPa"),
        wind = or_blank(current.wind_speed, " m/s"),
    )
}

fn forecast_section(entries: &[ForecastEntry]) -> String {
    if entries.is_empty() {
        return "<section class=\"forecast\"><h2>Forecast</h2><p>No forecast available.</p></section>"
            .to_string();
    }

    let rows: String = entries
        .iter()
        .map(|e| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                text(e.time.as_deref().unwrap_or("")),
                temperature(e.temperature),
                or_blank(e.humidity, " %"),
                text(e.description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    format!(
        r#"<section class="forecast">
<h2>5-day forecast</h2>
<table>
<thead><tr><th>Time</th><th>Temperature</th><th>Humidity</th><th>Conditions</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</section>"#
    )
}

fn map_section(maps_key: &str, location: &str) -> String {
    let src = format!(
        "{MAPS_EMBED_URL}?key={}&q={}",
        url::form_urlencoded::byte_serialize(maps_key.as_bytes()).collect::<String>(),
        url::form_urlencoded::byte_serialize(location.as_bytes()).collect::<String>(),
    );

    format!(
        r#"<section class="map"><iframe title="Map" src="{}" loading="lazy" allowfullscreen></iframe></section>"#,
        attr(&src)
    )
}

pub fn results_page(flashes: &[Flash], view: &RecordView, maps_key: Option<&str>) -> Html<String> {
    let record = &view.record;
    let mut body = format!(
        r#"<h1>Weather for {location}</h1>
<p class="meta">Date range: {date_range} · saved {created_at}</p>
"#,
        location = text(&record.location),
        date_range = text(&record.date_range),
        created_at = text(&record.created_at),
    );

    body.push_str(&current_section(&view.payload.current_conditions()));
    body.push('\n');
    body.push_str(&forecast_section(&view.payload.forecast_entries()));
    body.push('\n');

    if let Some(key) = maps_key {
        body.push_str(&map_section(key, &record.location));
        body.push('\n');
    }

    body.push_str(&format!(
        r#"<p><a href="/edit/{id}">Edit</a> · <a href="/records">All records</a></p>"#,
        id = record.id
    ));

    layout(&record.location, flashes, &body)
}

pub fn records_page(flashes: &[Flash], records: &[WeatherRecord]) -> Html<String> {
    if records.is_empty() {
        return layout(
            "Saved records",
            flashes,
            "<h1>Saved records</h1>\n<p>No saved records yet.</p>",
        );
    }

    let rows: String = records
        .iter()
        .map(|r| {
            format!(
                r#"<tr>
<td>{id}</td><td>{location}</td><td>{date_range}</td><td>{created_at}</td><td>{updated_at}</td>
<td><a href="/results/{id}">View</a> <a href="/edit/{id}">Edit</a>
<form method="post" action="/delete/{id}" class="inline"><button type="submit">Delete</button></form></td>
</tr>
"#,
                id = r.id,
                location = text(&r.location),
                date_range = text(&r.date_range),
                created_at = text(&r.created_at),
                updated_at = text(r.updated_at.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Saved records</h1>
<table class="records">
<thead><tr><th>ID</th><th>Location</th><th>Date range</th><th>Created</th><th>Updated</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    );

    layout("Saved records", flashes, &body)
}

pub fn edit_page(flashes: &[Flash], record: &WeatherRecord) -> Html<String> {
    let body = format!(
        "<h1>Edit record {}</h1>\n{}",
        record.id,
        record_form(
            &format!("/edit/{}", record.id),
            &record.location,
            &record.date_range,
            "Save and refresh"
        )
    );
    layout("Edit record", flashes, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{} {}</h1>\n<p>{}</p>",
        status.as_u16(),
        text(title),
        text(message)
    );
    layout(title, &[], &body)
}
