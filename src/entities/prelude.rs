pub use super::weather_records::Entity as WeatherRecords;
