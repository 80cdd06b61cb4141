//! Types shared between the planner server and its clients.
//!
//! - [`models`]: records as they travel over the wire
//! - [`api`]: request bodies and their validation
//! - [`calendar`]: the day-column geometry used to lay out and drag events
//! - [`items`]: in-memory task and event values built on top of the two above
//! - [`realtime`]: the change signal exchanged over the socket

pub mod api;
pub mod calendar;
pub mod items;
pub mod models;
pub mod realtime;
pub mod time;

pub use calendar::{CalendarDay, DragGesture, DragPayload, PercentSpan, PixelSpan, TimeSpan};
pub use items::{CalendarEvent, TaskItem};
pub use models::{Event, Task};
pub use time::{format_timestamp, parse_timestamp, TimestampError};
