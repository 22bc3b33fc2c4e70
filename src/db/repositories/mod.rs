pub mod weather_record;
