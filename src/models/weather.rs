use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `cod` value the provider reports for a successful lookup.
pub const STATUS_OK: i64 = 200;

const DEFAULT_ERROR_MESSAGE: &str = "Invalid location or API error";

/// Raw provider bodies for one location, stored verbatim as `weather_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub current: Value,
    pub forecast: Value,
}

impl WeatherPayload {
    #[must_use]
    pub const fn new(current: Value, forecast: Value) -> Self {
        Self { current, forecast }
    }

    /// Synthetic payload used when no request could be completed.
    #[must_use]
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            current: json!({ "cod": code, "message": message.into() }),
            forecast: json!({}),
        }
    }

    /// The `cod` field of the current-weather body. Missing or non-integer values read as 0.
    #[must_use]
    pub fn status_code(&self) -> i64 {
        match self.current.get("cod") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code() == STATUS_OK
    }

    #[must_use]
    pub fn error_message(&self) -> String {
        match self.current.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => DEFAULT_ERROR_MESSAGE.to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    #[must_use]
    pub fn current_conditions(&self) -> CurrentConditions {
        CurrentConditions::from_value(&self.current)
    }

    #[must_use]
    pub fn forecast_entries(&self) -> Vec<ForecastEntry> {
        self.forecast
            .get("list")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(ForecastEntry::from_value).collect())
            .unwrap_or_default()
    }
}

/// Display view over the current-weather body. Absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    pub city: Option<String>,
    pub country: Option<String>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<i64>,
    pub pressure: Option<i64>,
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CurrentConditions {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            city: str_at(value, &["name"]),
            country: str_at(value, &["sys", "country"]),
            temperature: f64_at(value, &["main", "temp"]),
            feels_like: f64_at(value, &["main", "feels_like"]),
            humidity: i64_at(value, &["main", "humidity"]),
            pressure: i64_at(value, &["main", "pressure"]),
            wind_speed: f64_at(value, &["wind", "speed"]),
            description: first_description(value),
            latitude: f64_at(value, &["coord", "lat"]),
            longitude: f64_at(value, &["coord", "lon"]),
        }
    }
}

/// One 3-hour slot of the 5-day forecast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastEntry {
    pub time: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<i64>,
    pub description: Option<String>,
}

impl ForecastEntry {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            time: str_at(value, &["dt_txt"]),
            temperature: f64_at(value, &["main", "temp"]),
            humidity: i64_at(value, &["main", "humidity"]),
            description: first_description(value),
        }
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

fn str_at(value: &Value, path: &[&str]) -> Option<String> {
    lookup(value, path)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn f64_at(value: &Value, path: &[&str]) -> Option<f64> {
    lookup(value, path).and_then(Value::as_f64)
}

fn i64_at(value: &Value, path: &[&str]) -> Option<i64> {
    lookup(value, path).and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
}

fn first_description(value: &Value) -> Option<String> {
    value
        .get("weather")
        .and_then(Value::as_array)
        .and_then(|w| w.first())
        .and_then(|w| w.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
