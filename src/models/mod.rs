pub mod record;
pub mod weather;

pub use record::{KeyError, RecordKey, WeatherRecord};
pub use weather::{CurrentConditions, ForecastEntry, WeatherPayload};
