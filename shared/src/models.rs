use serde::{Deserialize, Serialize};

/// Task record as returned by the server.
///
/// `done` is stored as an integer column and surfaced here as a boolean.
/// Timestamps are ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    pub userid: String,
    pub title: String,
    pub description: String,
    pub done: bool,
    /// Estimated duration in minutes
    pub estimated_time: i32,
    pub due_date: Option<String>,
    pub scheduled_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Event record as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i32,
    pub userid: String,
    pub title: String,
    pub description: String,
    pub from: String,
    pub to: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_json_uses_plain_field_names() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": 3,
                "userid": "user_2abc",
                "title": "Homework",
                "description": "",
                "done": true,
                "estimated_time": 45,
                "due_date": null,
                "scheduled_at": "2025-05-19T08:00:00.000+02:00",
                "created_at": "2025-05-18T10:00:00.000+00:00",
                "updated_at": "2025-05-18T10:00:00.000+00:00"
            }"#,
        )
        .unwrap();

        assert!(task.done);
        assert_eq!(task.estimated_time, 45);
        assert!(task.due_date.is_none());
    }

    #[test]
    fn event_serializes_from_and_to() {
        let event = Event {
            id: 1,
            userid: "u".to_string(),
            title: "wedding".to_string(),
            description: String::new(),
            from: "2025-05-19T08:30:26.195+02:00".to_string(),
            to: "2025-05-19T12:32:55.883+02:00".to_string(),
            created_at: "2025-05-18T10:00:00.000+00:00".to_string(),
            updated_at: "2025-05-18T10:00:00.000+00:00".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["from"], "2025-05-19T08:30:26.195+02:00");
        assert_eq!(json["to"], "2025-05-19T12:32:55.883+02:00");
    }
}
