pub mod events;
pub mod health;
pub mod tasks;

use crate::error::{ApiError, ApiResult};

/// Row ids are integers; anything else counts as a missing id.
pub(crate) fn parse_id(raw: &str) -> ApiResult<i32> {
    raw.trim().parse().map_err(|_| ApiError::MissingId)
}

/// `PUT` or `DELETE` on a collection path.
pub async fn missing_id() -> ApiError {
    ApiError::MissingId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::MissingId)));
        assert!(matches!(parse_id(""), Err(ApiError::MissingId)));
    }
}
