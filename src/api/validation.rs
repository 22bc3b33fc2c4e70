use super::ApiError;

/// Record ids arrive as raw path segments; anything that is not a positive
/// integer cannot name a record.
pub fn parse_record_id(raw: &str) -> Result<i32, ApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::not_found("Record", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("42").unwrap(), 42);
        assert!(matches!(parse_record_id("0"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_record_id("-3"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_record_id("abc"), Err(ApiError::NotFound(_))));
    }
}
