use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::time::parse_timestamp;

// ============================================================================
// Task API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub done: bool,

    #[validate(range(min = 0))]
    pub estimated_time: i32,

    #[validate(custom = "validate_timestamp")]
    pub due_date: Option<String>,

    #[validate(custom = "validate_timestamp")]
    pub scheduled_at: Option<String>,
}

/// Partial task update. Absent fields are left alone; for the nullable
/// columns an explicit `null` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,

    #[validate(range(min = 0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<i32>,

    #[validate(custom = "validate_timestamp")]
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<String>>,

    #[validate(custom = "validate_timestamp")]
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<Option<String>>,
}

// ============================================================================
// Event API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom = "validate_timestamp")]
    pub from: String,

    #[validate(custom = "validate_timestamp")]
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(custom = "validate_timestamp")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[validate(custom = "validate_timestamp")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_timestamp(value: &str) -> Result<(), ValidationError> {
    parse_timestamp(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("timestamp"))
}

/// Deserialize a present field (including `null`) as `Some(..)`, so that
/// `#[serde(default)]` leaves absent fields as `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_from_null() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(absent.done, Some(true));
        assert_eq!(absent.scheduled_at, None);

        let cleared: UpdateTaskRequest =
            serde_json::from_str(r#"{"scheduled_at": null}"#).unwrap();
        assert_eq!(cleared.scheduled_at, Some(None));

        let set: UpdateTaskRequest =
            serde_json::from_str(r#"{"scheduled_at": "2025-05-19T08:00:00+02:00"}"#).unwrap();
        assert_eq!(
            set.scheduled_at,
            Some(Some("2025-05-19T08:00:00+02:00".to_string()))
        );
    }

    #[test]
    fn partial_update_serializes_only_set_fields() {
        let request = UpdateTaskRequest {
            scheduled_at: Some(None),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "scheduled_at": null }));
    }

    #[test]
    fn create_task_rejects_bad_timestamp_and_negative_estimate() {
        let request = CreateTaskRequest {
            title: "Homework".to_string(),
            description: String::new(),
            done: false,
            estimated_time: -5,
            due_date: Some("tomorrow-ish".to_string()),
            scheduled_at: None,
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("estimated_time"));
        assert!(fields.contains_key("due_date"));
        assert!(!fields.contains_key("scheduled_at"));
    }

    #[test]
    fn create_event_accepts_naive_timestamps_without_checking_order() {
        let request = CreateEventRequest {
            title: "funeral".to_string(),
            description: String::new(),
            from: "2025-05-19T18:00:00".to_string(),
            to: "2025-05-19T15:00:00".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected() {
        let request: CreateEventRequest = serde_json::from_str(
            r#"{"title": "", "from": "2025-05-19", "to": "2025-05-20"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn error_response_omits_missing_details() {
        let json = serde_json::to_value(ErrorResponse::new("Needs an id")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Needs an id" }));
    }
}
