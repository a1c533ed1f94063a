// Calendar core - listing upcoming events and booking focus blocks.
//
// Events are owned by the remote calendar. We only ever insert new ones and
// read a time range back; nothing here edits or deletes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::core::config::ConfigError;

/// Upper bound on events shown in one listing.
pub const MAX_LISTED_EVENTS: usize = 50;

/// Local hour used when a focus block has no explicit start.
const DEFAULT_START_HOUR: u32 = 6;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Calendar request failed: {0}")]
    Remote(String),
}

/// When an event starts: a point in time, or a whole day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventStart {
    At(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub start: Option<EventStart>,
    /// Link to the event in the calendar web UI.
    pub html_link: Option<String>,
}

/// An event to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Time-range access to one calendar.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError>;
}

/// Listing periods offered in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    Day,
    Week,
    Month,
}

impl EventWindow {
    pub fn days(self) -> i64 {
        match self {
            EventWindow::Day => 1,
            EventWindow::Week => 7,
            EventWindow::Month => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventWindow::Day => "day",
            EventWindow::Week => "week",
            EventWindow::Month => "month",
        }
    }
}

pub struct CalendarService<C: CalendarApi> {
    api: C,
    timezone: Tz,
}

impl<C: CalendarApi> CalendarService<C> {
    pub fn new(api: C, timezone: Tz) -> Self {
        Self { api, timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Events from now until the end of the window.
    pub async fn upcoming(&self, window: EventWindow) -> Result<Vec<CalendarEvent>, CalendarError> {
        let now = Utc::now();
        let until = now + Duration::days(window.days());
        self.list_events(now, until, MAX_LISTED_EVENTS).await
    }

    pub async fn list_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.api.list_events(from, to, max_results).await
    }

    /// Books a block of `minutes` starting at `start`, or tomorrow at 06:00
    /// local time when no start is given.
    pub async fn create_event(
        &self,
        summary: &str,
        minutes: u32,
        start: Option<DateTime<Tz>>,
        description: &str,
    ) -> Result<CalendarEvent, CalendarError> {
        let start = start.unwrap_or_else(|| default_start(Utc::now().with_timezone(&self.timezone)));
        let event = NewEvent {
            summary: summary.to_string(),
            description: description.to_string(),
            end: start + Duration::minutes(i64::from(minutes)),
            start,
        };

        let created = self.api.insert_event(&event).await?;
        tracing::info!(
            event_id = %created.id,
            start = %event.start.to_rfc3339(),
            minutes,
            "Created calendar event"
        );
        Ok(created)
    }
}

/// Tomorrow at 06:00 in the time zone of `now`.
pub fn default_start(now: DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let date = now.date_naive() + Duration::days(1);
    let naive = date.and_time(NaiveTime::from_hms_opt(DEFAULT_START_HOUR, 0, 0).unwrap_or_default());

    // A DST gap at 06:00 is practically unheard of, but resolve it anyway.
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// One line per event, in local time, under a title line.
/// Returns an empty string when there is nothing to show.
pub fn format_events(title: &str, events: &[CalendarEvent], timezone: Tz) -> String {
    if events.is_empty() {
        return String::new();
    }

    let mut lines = vec![title.to_string()];
    for event in events {
        let when = match &event.start {
            Some(EventStart::At(at)) => at.with_timezone(&timezone).format("%a %d.%m %H:%M").to_string(),
            Some(EventStart::AllDay(day)) => format!("{} (all day)", day.format("%a %d.%m")),
            None => "??".to_string(),
        };
        let summary = if event.summary.trim().is_empty() {
            "(no title)"
        } else {
            event.summary.trim()
        };
        lines.push(format!("• {} — {}", when, summary));
    }
    lines.join("\n")
}
