pub mod prelude;

pub mod weather_records;
