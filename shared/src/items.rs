//! In-memory task and event values used by clients.
//!
//! These hold parsed timestamps and know how to place themselves on a day
//! column. Converting back to request bodies drops the task back-reference a
//! scheduled task's event carries; it never goes over the wire.

use chrono::{DateTime, Duration, FixedOffset};

use crate::api::{CreateEventRequest, CreateTaskRequest, UpdateEventRequest, UpdateTaskRequest};
use crate::calendar::{
    self, CalendarDay, DragGesture, DragPayload, PercentSpan, PixelSpan, TimeSpan,
};
use crate::models::{Event, Task};
use crate::time::{format_timestamp, parse_optional_timestamp, parse_timestamp, TimestampError};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: Option<i32>,
    pub title: String,
    pub description: String,
    pub done: bool,
    /// Minutes
    pub estimated_time: i32,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub scheduled_at: Option<DateTime<FixedOffset>>,
}

impl TaskItem {
    pub fn new(title: impl Into<String>, estimated_time: i32) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            done: false,
            estimated_time,
            due_date: None,
            scheduled_at: None,
        }
    }

    pub fn from_wire(task: &Task) -> Result<Self, TimestampError> {
        Ok(Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            done: task.done,
            estimated_time: task.estimated_time,
            due_date: parse_optional_timestamp(task.due_date.as_deref())?,
            scheduled_at: parse_optional_timestamp(task.scheduled_at.as_deref())?,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_at.is_some()
    }

    /// The block this task occupies on the calendar, if it is scheduled and
    /// its end still lands on a representable date.
    pub fn to_calendar_event(&self) -> Option<CalendarEvent> {
        let from = self.scheduled_at?;
        let to = from.checked_add_signed(Duration::minutes(i64::from(self.estimated_time)))?;

        Some(CalendarEvent {
            id: self.id,
            title: self.title.clone(),
            from,
            to,
            description: self.description.clone(),
            task: Some(Box::new(self.clone())),
        })
    }

    pub fn to_create_request(&self) -> CreateTaskRequest {
        CreateTaskRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            done: self.done,
            estimated_time: self.estimated_time,
            due_date: self.due_date.as_ref().map(format_timestamp),
            scheduled_at: self.scheduled_at.as_ref().map(format_timestamp),
        }
    }

    /// Full update body; unset dates are sent as explicit nulls.
    pub fn to_update_request(&self) -> UpdateTaskRequest {
        UpdateTaskRequest {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            done: Some(self.done),
            estimated_time: Some(self.estimated_time),
            due_date: Some(self.due_date.as_ref().map(format_timestamp)),
            scheduled_at: Some(self.scheduled_at.as_ref().map(format_timestamp)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: Option<i32>,
    pub title: String,
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
    pub description: String,
    /// Set when this block stands for a scheduled task
    pub task: Option<Box<TaskItem>>,
}

impl CalendarEvent {
    pub fn new(
        id: Option<i32>,
        title: impl Into<String>,
        span: TimeSpan,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            from: span.from,
            to: span.to,
            description: description.into(),
            task: None,
        }
    }

    pub fn from_wire(event: &Event) -> Result<Self, TimestampError> {
        let span = TimeSpan::new(parse_timestamp(&event.from)?, parse_timestamp(&event.to)?);
        Ok(Self::new(
            Some(event.id),
            event.title.clone(),
            span,
            event.description.clone(),
        ))
    }

    pub fn from_percent_span(
        id: Option<i32>,
        title: impl Into<String>,
        dimensions: PercentSpan,
        day: CalendarDay,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            title,
            calendar::from_percent_span(day, dimensions),
            description,
        )
    }

    pub fn from_pixel_span(
        id: Option<i32>,
        title: impl Into<String>,
        dimensions: PixelSpan,
        column_height: f64,
        day: CalendarDay,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            title,
            calendar::from_pixel_span(day, dimensions, column_height),
            description,
        )
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.from, self.to)
    }

    pub fn percent_span(&self) -> PercentSpan {
        calendar::to_percent_span(&self.span())
    }

    pub fn pixel_span(&self, column_height: f64) -> PixelSpan {
        calendar::to_pixel_span(&self.span(), column_height)
    }

    pub fn is_persistent(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_task(&self) -> bool {
        self.task.is_some()
    }

    /// Copy of this event moved to where `payload` dropped it.
    pub fn dragged(&self, payload: &DragPayload, column_height: f64) -> Self {
        self.apply_drag(DragGesture::Move, payload, column_height)
    }

    pub fn apply_drag(
        &self,
        gesture: DragGesture,
        payload: &DragPayload,
        column_height: f64,
    ) -> Self {
        let span = calendar::apply_drag(&self.span(), gesture, payload, column_height);
        Self {
            from: span.from,
            to: span.to,
            ..self.clone()
        }
    }

    /// In-place variant of [`CalendarEvent::apply_drag`].
    pub fn update_with_drag(
        &mut self,
        gesture: DragGesture,
        payload: &DragPayload,
        column_height: f64,
    ) -> &mut Self {
        let span = calendar::apply_drag(&self.span(), gesture, payload, column_height);
        self.from = span.from;
        self.to = span.to;
        self
    }

    /// Take over title, description and edges from `other`.
    pub fn update_with(&mut self, other: &CalendarEvent) -> &mut Self {
        self.title = other.title.clone();
        self.description = other.description.clone();
        self.from = other.from;
        self.to = other.to;
        self
    }

    pub fn to_drag_payload(&self, column_height: f64, pointer_y: f64) -> DragPayload {
        calendar::to_drag_payload(&self.span(), column_height, pointer_y)
    }

    /// The task behind this block, rescheduled to the block's current edges.
    pub fn rescheduled_task(&self) -> Option<TaskItem> {
        let task = self.task.as_deref()?;
        let minutes = ((self.to - self.from).num_milliseconds() as f64 / 60_000.0).round();
        let estimated_time = if minutes.is_finite()
            && minutes >= f64::from(i32::MIN)
            && minutes <= f64::from(i32::MAX)
        {
            minutes as i32
        } else {
            task.estimated_time
        };

        Some(TaskItem {
            scheduled_at: Some(self.from),
            estimated_time,
            ..task.clone()
        })
    }

    pub fn to_create_request(&self) -> CreateEventRequest {
        CreateEventRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            from: format_timestamp(&self.from),
            to: format_timestamp(&self.to),
        }
    }

    pub fn to_update_request(&self) -> UpdateEventRequest {
        UpdateEventRequest {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            from: Some(format_timestamp(&self.from)),
            to: Some(format_timestamp(&self.to)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn wire_event() -> Event {
        Event {
            id: 7,
            userid: "user_2abc".to_string(),
            title: "wedding".to_string(),
            description: "bring flowers".to_string(),
            from: "2025-05-19T08:30:26.195+02:00".to_string(),
            to: "2025-05-19T12:32:55.883+02:00".to_string(),
            created_at: "2025-05-18T10:00:00.000+00:00".to_string(),
            updated_at: "2025-05-18T10:00:00.000+00:00".to_string(),
        }
    }

    fn wire_task(scheduled_at: Option<&str>) -> Task {
        Task {
            id: 3,
            userid: "user_2abc".to_string(),
            title: "Homework".to_string(),
            description: "chapter 4".to_string(),
            done: false,
            estimated_time: 90,
            due_date: Some("2025-05-23".to_string()),
            scheduled_at: scheduled_at.map(str::to_string),
            created_at: "2025-05-18T10:00:00.000+00:00".to_string(),
            updated_at: "2025-05-18T10:00:00.000+00:00".to_string(),
        }
    }

    #[test]
    fn wire_event_round_trips_through_request() {
        let event = CalendarEvent::from_wire(&wire_event()).unwrap();
        assert!(event.is_persistent());
        assert!(!event.is_task());

        let request = event.to_create_request();
        assert_eq!(request.from, "2025-05-19T08:30:26.195+02:00");
        assert_eq!(request.to, "2025-05-19T12:32:55.883+02:00");
        assert_eq!(request.description, "bring flowers");
    }

    #[test]
    fn malformed_wire_timestamp_is_an_error() {
        let mut event = wire_event();
        event.to = "soon".to_string();
        assert!(CalendarEvent::from_wire(&event).is_err());
    }

    #[test]
    fn unscheduled_task_has_no_block() {
        let task = TaskItem::from_wire(&wire_task(None)).unwrap();
        assert!(task.is_persistent());
        assert!(!task.is_scheduled());
        assert!(task.to_calendar_event().is_none());
    }

    #[test]
    fn scheduled_task_becomes_event_with_back_reference() {
        let task = TaskItem::from_wire(&wire_task(Some("2025-05-19T08:00:00+02:00"))).unwrap();
        let event = task.to_calendar_event().unwrap();

        assert!(event.is_task());
        assert_eq!(event.to - event.from, Duration::minutes(90));
        assert_eq!(event.title, "Homework");
        assert_eq!(event.task.as_deref(), Some(&task));

        // The back-reference is not part of the request body.
        let body = serde_json::to_value(event.to_update_request()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "title": "Homework",
                "description": "chapter 4",
                "from": "2025-05-19T08:00:00.000+02:00",
                "to": "2025-05-19T09:30:00.000+02:00",
            })
        );
    }

    #[test]
    fn dragging_a_task_block_reschedules_the_task() {
        let task = TaskItem::from_wire(&wire_task(Some("2025-05-19T08:00:00"))).unwrap();
        let block = task.to_calendar_event().unwrap();
        let day = CalendarDay::of(&block.from);

        // 1440px column: one pixel per minute
        let moved = block.dragged(&DragPayload::new(day, 600.0, 120.0), 1440.0);
        let rescheduled = moved.rescheduled_task().unwrap();

        assert_eq!(
            rescheduled.scheduled_at,
            Some(parse_timestamp("2025-05-19T10:00:00").unwrap())
        );
        assert_eq!(rescheduled.estimated_time, 120);
        assert_eq!(rescheduled.id, Some(3));
    }

    #[test]
    fn update_with_drag_mutates_only_edges() {
        let mut event = CalendarEvent::from_wire(&wire_event()).unwrap();
        let day = CalendarDay::of(&event.from);

        event.update_with_drag(DragGesture::ResizeEnd, &DragPayload::new(day, 0.0, 720.0), 1440.0);

        assert_eq!(event.from, parse_timestamp("2025-05-19T08:30:26.195+02:00").unwrap());
        assert_eq!(event.to, parse_timestamp("2025-05-19T12:00:00+02:00").unwrap());
        assert_eq!(event.title, "wedding");
    }

    #[test]
    fn pixel_constructor_matches_percent_constructor() {
        let day = CalendarDay::of(&parse_timestamp("2025-05-19").unwrap());
        let by_pixels = CalendarEvent::from_pixel_span(
            None,
            "standup",
            PixelSpan { from: 360.0, to: 390.0 },
            1440.0,
            day,
            "",
        );
        let by_percent = CalendarEvent::from_percent_span(
            None,
            "standup",
            PercentSpan {
                from: 25.0,
                to: 390.0 / 14.4,
            },
            day,
            "",
        );

        assert_eq!(by_pixels.from, by_percent.from);
        assert_eq!(by_pixels.to, by_percent.to);
        assert!(!by_pixels.is_persistent());
    }

    #[test]
    fn task_update_request_clears_unset_dates() {
        let mut task = TaskItem::new("Laundry", 30);
        task.done = true;

        let body = serde_json::to_value(task.to_update_request()).unwrap();
        assert_eq!(body["done"], true);
        assert_eq!(body["scheduled_at"], serde_json::Value::Null);
        assert!(body.as_object().unwrap().contains_key("scheduled_at"));
    }

    #[test]
    fn task_ending_past_the_last_representable_date_has_no_block() {
        let raw = "+262142-12-31T23:00:00";
        let request = CreateTaskRequest {
            title: "Far future".to_string(),
            description: String::new(),
            done: false,
            estimated_time: 120,
            due_date: None,
            scheduled_at: Some(raw.to_string()),
        };
        assert!(request.validate().is_ok());

        let mut task = TaskItem::new("Far future", 120);
        task.scheduled_at = Some(parse_timestamp(raw).unwrap());

        assert!(task.to_calendar_event().is_none());
    }

    #[test]
    fn rescheduled_estimate_rounds_to_the_nearest_minute() {
        let task = TaskItem::from_wire(&wire_task(Some("2025-05-19T08:00:00"))).unwrap();
        let block = task.to_calendar_event().unwrap();
        let day = CalendarDay::of(&block.from);

        // 960px column: 59.99px is 89.985 minutes
        let moved = block.dragged(&DragPayload::new(day, 320.0, 59.99), 960.0);
        assert_eq!(moved.rescheduled_task().unwrap().estimated_time, 90);
    }
}
