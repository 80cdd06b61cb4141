// Database models for Diesel
use diesel::prelude::*;
use planner_shared::api::{UpdateEventRequest, UpdateTaskRequest};
use planner_shared::{Event, Task};

/// Database representation of `task`; `done` is an INTEGER column
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::task)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskRow {
    pub id: i32,
    pub userid: String,
    pub title: String,
    pub description: String,
    pub done: i32,
    pub scheduled_at: Option<String>,
    pub estimated_time: i32,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            userid: row.userid,
            title: row.title,
            description: row.description,
            done: row.done != 0,
            estimated_time: row.estimated_time,
            due_date: row.due_date,
            scheduled_at: row.scheduled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::task)]
pub struct NewTask {
    pub userid: String,
    pub title: String,
    pub description: String,
    pub done: i32,
    pub scheduled_at: Option<String>,
    pub estimated_time: i32,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Field-level patch for `task`. `None` leaves a column alone; for the
/// nullable columns `Some(None)` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::task)]
pub struct TaskChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<i32>,
    pub scheduled_at: Option<Option<String>>,
    pub estimated_time: Option<i32>,
    pub due_date: Option<Option<String>>,
    pub updated_at: String,
}

impl TaskChangeset {
    pub fn from_request(request: UpdateTaskRequest, updated_at: String) -> Self {
        Self {
            title: request.title,
            description: request.description,
            done: request.done.map(i32::from),
            scheduled_at: request.scheduled_at,
            estimated_time: request.estimated_time,
            due_date: request.due_date,
            updated_at,
        }
    }
}

/// Database representation of `event`; `from`/`to` are renamed because both
/// are SQL keywords
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::event)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRow {
    pub id: i32,
    pub userid: String,
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub ends_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            userid: row.userid,
            title: row.title,
            description: row.description,
            from: row.starts_at,
            to: row.ends_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::event)]
pub struct NewEvent {
    pub userid: String,
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub ends_at: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::event)]
pub struct EventChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub updated_at: String,
}

impl EventChangeset {
    pub fn from_request(request: UpdateEventRequest, updated_at: String) -> Self {
        Self {
            title: request.title,
            description: request.description,
            starts_at: request.from,
            ends_at: request.to,
            updated_at,
        }
    }
}
