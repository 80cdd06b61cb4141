//! Day-column geometry for the calendar grid.
//!
//! A calendar column represents one local day. Positions inside it are either
//! a percentage of the 24 hours or a pixel offset within a column of a given
//! height. Every conversion is measured from local midnight of the day the
//! span starts on, in the offset that timestamp carries. Nothing here clamps:
//! a span running past midnight maps to more than 100%, and a span with
//! `to < from` maps to a negative height.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const MINUTES_IN_DAY: f64 = 24.0 * 60.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Edges of a span as percentages of a 24-hour day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentSpan {
    pub from: f64,
    pub to: f64,
}

impl PercentSpan {
    pub fn to_pixels(self, column_height: f64) -> PixelSpan {
        PixelSpan {
            from: (self.from / 100.0) * column_height,
            to: (self.to / 100.0) * column_height,
        }
    }

    pub fn length(self) -> f64 {
        self.to - self.from
    }
}

/// Edges of a span as pixel offsets from the top of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpan {
    pub from: f64,
    pub to: f64,
}

impl PixelSpan {
    pub fn to_percent(self, column_height: f64) -> PercentSpan {
        PercentSpan {
            from: self.from * 100.0 / column_height,
            to: self.to * 100.0 / column_height,
        }
    }

    pub fn height(self) -> f64 {
        self.to - self.from
    }
}

/// Start and end of something on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
}

impl TimeSpan {
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Self {
        Self { from, to }
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    fn overlaps(&self, other: &TimeSpan) -> bool {
        self.from < other.to && other.from < self.to
    }
}

/// The local day a calendar column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub offset: FixedOffset,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        Self { date, offset }
    }

    /// The day `timestamp` falls on, in its own offset.
    pub fn of(timestamp: &DateTime<FixedOffset>) -> Self {
        Self {
            date: timestamp.date_naive(),
            offset: *timestamp.offset(),
        }
    }

    /// Local midnight.
    pub fn start(&self) -> DateTime<FixedOffset> {
        let local_midnight = self.date.and_time(NaiveTime::MIN);
        // Only the first representable day east of UTC has no UTC midnight
        let utc_midnight = local_midnight
            .checked_sub_signed(Duration::seconds(i64::from(self.offset.local_minus_utc())))
            .unwrap_or(NaiveDateTime::MIN);
        DateTime::from_naive_utc_and_offset(utc_midnight, self.offset)
    }

    /// Local midnight plus `minutes`, at millisecond resolution.
    ///
    /// Offsets that chrono cannot represent (NaN, infinities, centuries away)
    /// collapse to midnight.
    pub fn at_minutes(&self, minutes: f64) -> DateTime<FixedOffset> {
        let start = self.start();
        let millis = (minutes * MILLIS_PER_MINUTE).round();
        if !millis.is_finite() {
            return start;
        }

        Duration::try_milliseconds(millis as i64)
            .and_then(|delta| start.checked_add_signed(delta))
            .unwrap_or(start)
    }
}

/// Pixel-space description of a drag on a day column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPayload {
    /// Column the block was dropped on
    pub day: CalendarDay,
    /// Top edge of the block, in pixels from the column top
    pub top: f64,
    /// Block height in pixels
    pub height: f64,
    /// Where inside the block the pointer grabbed it
    pub offset: f64,
}

impl DragPayload {
    pub fn new(day: CalendarDay, top: f64, height: f64) -> Self {
        Self {
            day,
            top,
            height,
            offset: 0.0,
        }
    }

    pub fn pixel_span(&self) -> PixelSpan {
        PixelSpan {
            from: self.top,
            to: self.top + self.height,
        }
    }
}

/// Which edges of a block a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragGesture {
    /// Both edges follow the payload
    Move,
    /// Only the start follows the payload top; the end stays put
    ResizeStart,
    /// Only the end follows the payload bottom; the start stays put
    ResizeEnd,
}

/// An hour gridline on a day column.
#[derive(Debug, Clone, PartialEq)]
pub struct Separator {
    pub label: String,
    pub time: DateTime<FixedOffset>,
    pub percent: f64,
}

fn minutes_between(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_MINUTE
}

pub fn to_percent_span(span: &TimeSpan) -> PercentSpan {
    let start_of_day = CalendarDay::of(&span.from).start();
    let from = minutes_between(start_of_day, span.from) / MINUTES_IN_DAY;
    let to = minutes_between(start_of_day, span.to) / MINUTES_IN_DAY;

    PercentSpan {
        from: from * 100.0,
        to: to * 100.0,
    }
}

pub fn to_pixel_span(span: &TimeSpan, column_height: f64) -> PixelSpan {
    to_percent_span(span).to_pixels(column_height)
}

pub fn from_percent_span(day: CalendarDay, span: PercentSpan) -> TimeSpan {
    TimeSpan {
        from: day.at_minutes((span.from / 100.0) * MINUTES_IN_DAY),
        to: day.at_minutes((span.to / 100.0) * MINUTES_IN_DAY),
    }
}

pub fn from_pixel_span(day: CalendarDay, span: PixelSpan, column_height: f64) -> TimeSpan {
    from_percent_span(day, span.to_percent(column_height))
}

/// Rebuild a span from a finished drag.
pub fn apply_drag(
    span: &TimeSpan,
    gesture: DragGesture,
    payload: &DragPayload,
    column_height: f64,
) -> TimeSpan {
    let target = from_pixel_span(payload.day, payload.pixel_span(), column_height);

    match gesture {
        DragGesture::Move => target,
        DragGesture::ResizeStart => TimeSpan {
            from: target.from,
            to: span.to,
        },
        DragGesture::ResizeEnd => TimeSpan {
            from: span.from,
            to: target.to,
        },
    }
}

/// Describe a block being picked up at `pointer_y`.
pub fn to_drag_payload(span: &TimeSpan, column_height: f64, pointer_y: f64) -> DragPayload {
    let pixels = to_pixel_span(span, column_height);

    DragPayload {
        day: CalendarDay::of(&span.from),
        top: pixels.from,
        height: pixels.height(),
        offset: pointer_y - pixels.from,
    }
}

/// For each span, the number of spans that start earlier (ties broken by
/// position) and overlap it. Used to push blocks into side-by-side lanes.
pub fn collisions(spans: &[TimeSpan]) -> Vec<usize> {
    spans
        .iter()
        .enumerate()
        .map(|(i, span)| {
            spans
                .iter()
                .enumerate()
                .filter(|(j, other)| (other.from, *j) < (span.from, i) && other.overlaps(span))
                .count()
        })
        .collect()
}

pub fn hour_separators(day: CalendarDay) -> Vec<Separator> {
    (0..24u32)
        .map(|hour| {
            let minutes = f64::from(hour) * 60.0;
            Separator {
                label: format!("{:02}:00", hour),
                time: day.at_minutes(minutes),
                percent: minutes / MINUTES_IN_DAY * 100.0,
            }
        })
        .collect()
}
