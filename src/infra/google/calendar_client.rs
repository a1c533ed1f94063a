// Google Calendar API v3 adapter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use super::{GoogleApiError, ServiceAccountAuth};
use crate::core::calendar::{CalendarApi, CalendarError, CalendarEvent, EventStart, NewEvent};
use crate::core::config::{require, CALENDAR_ID_VAR};

const CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/calendars/";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Largest page the events endpoint accepts.
const MAX_RESULTS_CAP: usize = 250;

// ============================================================================
// API response types (deserialized from Google Calendar JSON)
// ============================================================================

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEventRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventRaw {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    start: Option<EventDateTime>,
    #[serde(default)]
    html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl From<GoogleEventRaw> for CalendarEvent {
    fn from(raw: GoogleEventRaw) -> Self {
        CalendarEvent {
            id: raw.id,
            summary: raw.summary.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            start: raw.start.and_then(parse_start),
            html_link: raw.html_link,
        }
    }
}

fn parse_start(start: EventDateTime) -> Option<EventStart> {
    if let Some(at) = start
        .date_time
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    {
        return Some(EventStart::At(at));
    }
    start
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(EventStart::AllDay)
}

// ============================================================================
// Client
// ============================================================================

pub struct GoogleCalendarClient {
    client: Client,
    auth: ServiceAccountAuth,
    calendar_id: Option<String>,
}

impl GoogleCalendarClient {
    pub fn new(calendar_id: Option<String>, credential_source: Option<String>) -> Self {
        Self {
            client: Client::new(),
            auth: ServiceAccountAuth::new(credential_source, CALENDAR_SCOPE),
            calendar_id,
        }
    }

    /// Validates the configuration and returns the events URL and a token.
    async fn prepare(&self) -> Result<(Url, String), GoogleApiError> {
        let calendar_id = require(self.calendar_id.as_deref(), CALENDAR_ID_VAR)?;
        self.auth.credentials()?;

        let mut url =
            Url::parse(CALENDAR_API).map_err(|e| GoogleApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::InvalidUrl(CALENDAR_API.to_string()))?
            .pop_if_empty()
            .extend([calendar_id, "events"]);

        let token = self.auth.access_token().await?;
        Ok((url, token))
    }

    async fn list(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<CalendarEvent>, GoogleApiError> {
        let (url, token) = self.prepare().await?;
        let max_results = max_results.clamp(1, MAX_RESULTS_CAP).to_string();

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("timeMin", from.to_rfc3339_opts(SecondsFormat::Secs, true).as_str()),
                ("timeMax", to.to_rfc3339_opts(SecondsFormat::Secs, true).as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleApiError::from_response(response).await);
        }

        let body: EventListResponse = response.json().await?;
        Ok(body.items.into_iter().map(CalendarEvent::from).collect())
    }

    async fn insert(&self, event: &NewEvent) -> Result<CalendarEvent, GoogleApiError> {
        let (url, token) = self.prepare().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&event_body(event))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleApiError::from_response(response).await);
        }

        let created: GoogleEventRaw = response.json().await?;
        Ok(created.into())
    }
}

fn event_body(event: &NewEvent) -> serde_json::Value {
    let tz = event.start.timezone().name();
    json!({
        "summary": event.summary,
        "description": event.description,
        "start": { "dateTime": event.start.to_rfc3339(), "timeZone": tz },
        "end": { "dateTime": event.end.to_rfc3339(), "timeZone": tz },
    })
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_results: usize,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.list(from, to, max_results).await.map_err(|e| {
            tracing::warn!(error = %e, "Calendar listing failed");
            CalendarError::from(e)
        })
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        self.insert(event).await.map_err(|e| {
            tracing::warn!(error = %e, summary = %event.summary, "Calendar insert failed");
            CalendarError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::CalendarService;
    use crate::core::config::ConfigError;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_create_event_without_credentials_is_config_error() {
        let client = GoogleCalendarClient::new(Some("primary".to_string()), None);
        let service = CalendarService::new(client, chrono_tz::Europe::Moscow);

        let err = service
            .create_event("Focus: inventory", 30, None, "")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CalendarError::Config(ConfigError::MissingCredentialSource)
        ));
        assert!(err.to_string().contains("GOOGLE_CREDENTIALS_JSON"));
    }

    #[tokio::test]
    async fn test_missing_calendar_id_is_config_error() {
        let client = GoogleCalendarClient::new(None, Some("{}".to_string()));
        let err = client
            .list_events(Utc::now(), Utc::now(), 10)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CalendarError::Config(ConfigError::MissingSetting("CALENDAR_ID"))
        ));
    }

    #[test]
    fn test_raw_event_conversion() {
        let json = r#"{
            "items": [
                {
                    "id": "a1",
                    "summary": "Supplier call",
                    "start": { "dateTime": "2026-10-20T10:00:00+03:00" },
                    "htmlLink": "https://www.google.com/calendar/event?eid=a1"
                },
                { "id": "b2", "start": { "date": "2026-10-21" } },
                { "id": "c3" }
            ]
        }"#;
        let body: EventListResponse = serde_json::from_str(json).unwrap();
        let events: Vec<CalendarEvent> = body.items.into_iter().map(CalendarEvent::from).collect();

        assert_eq!(events[0].summary, "Supplier call");
        assert!(matches!(events[0].start, Some(EventStart::At(_))));
        assert_eq!(
            events[0].html_link.as_deref(),
            Some("https://www.google.com/calendar/event?eid=a1")
        );
        assert_eq!(
            events[1].start,
            Some(EventStart::AllDay(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()))
        );
        assert_eq!(events[1].summary, "");
        assert_eq!(events[2].start, None);
    }

    #[test]
    fn test_event_body_carries_time_zone() {
        let tz = chrono_tz::Europe::Moscow;
        let start = tz.with_ymd_and_hms(2026, 10, 20, 6, 0, 0).unwrap();
        let event = NewEvent {
            summary: "Focus: menu".to_string(),
            description: "from the backlog".to_string(),
            start,
            end: start + chrono::Duration::minutes(60),
        };

        let body = event_body(&event);
        assert_eq!(body["start"]["dateTime"], "2026-10-20T06:00:00+03:00");
        assert_eq!(body["end"]["dateTime"], "2026-10-20T07:00:00+03:00");
        assert_eq!(body["start"]["timeZone"], "Europe/Moscow");
    }
}
