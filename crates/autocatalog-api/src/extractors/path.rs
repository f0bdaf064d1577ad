//! Path parameter helpers.

use std::str::FromStr;

use autocatalog_core::error::AppError;

/// Parses an integer id for PUT and DELETE, where a bad id is a client error.
pub fn parse_id(s: &str) -> Result<i32, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid id: {s}")))
}

/// Parses an integer segment of a GET route. A segment that is not an
/// integer means the route does not match, so the answer is 404.
pub fn parse_route_int<N: FromStr>(s: &str) -> Result<N, AppError> {
    s.parse()
        .map_err(|_| AppError::not_found(format!("No route for segment '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocatalog_core::error::ErrorKind;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("abc").unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_parse_route_int() {
        assert_eq!(parse_route_int::<i64>("-3").unwrap(), -3);
        assert_eq!(
            parse_route_int::<i32>("x1").unwrap_err().kind,
            ErrorKind::NotFound
        );
    }
}
