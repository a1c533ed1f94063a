// Commitment actions: turn a ranked task into a focus block.
//
// A commitment is logged to the backlog first and then booked in the
// calendar. The backlog write is what matters; if only the calendar fails
// the user is told it was a partial success.

use chrono::NaiveDate;

use crate::core::backlog::{BacklogError, BacklogService, SheetStore};
use crate::core::calendar::{CalendarApi, CalendarError, CalendarService};
use crate::core::planning::{columns, SheetRecord};

/// Durations offered on the commitment buttons, in minutes.
pub const COMMIT_DURATIONS: [u32; 2] = [30, 60];

#[derive(Debug)]
pub enum CommitOutcome {
    /// Logged and booked. Carries the calendar link when the API returned one.
    Booked { link: Option<String> },
    /// Logged, but the calendar call failed.
    LoggedOnly { calendar_error: CalendarError },
}

/// Display name of a task row.
pub fn task_title(task: &SheetRecord) -> String {
    let title = task.get(columns::TASK).trim();
    if title.is_empty() {
        "Untitled task".to_string()
    } else {
        title.to_string()
    }
}

pub async fn commit_focus<S, C>(
    backlog: &BacklogService<S>,
    calendar: &CalendarService<C>,
    task: &SheetRecord,
    minutes: u32,
    author: &str,
    today: NaiveDate,
) -> Result<CommitOutcome, BacklogError>
where
    S: SheetStore,
    C: CalendarApi,
{
    let title = task_title(task);
    let category = task.get(columns::CATEGORY).trim();
    let entry_text = format!("Focus {} min: {}", minutes, title);

    backlog
        .append_entry(
            &entry_text,
            category,
            &today.format("%Y-%m-%d").to_string(),
            author,
        )
        .await?;

    let description = format!(
        "Focus block from the backlog.\nCategory: {}\nDeadline: {}",
        if category.is_empty() { "-" } else { category },
        match task.get(columns::DEADLINE).trim() {
            "" => "-",
            deadline => deadline,
        }
    );

    match calendar
        .create_event(&format!("Focus: {}", title), minutes, None, &description)
        .await
    {
        Ok(event) => Ok(CommitOutcome::Booked {
            link: event.html_link,
        }),
        Err(calendar_error) => {
            tracing::warn!(error = %calendar_error, task = %title, "Calendar booking failed after backlog append");
            Ok(CommitOutcome::LoggedOnly { calendar_error })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::{CalendarEvent, NewEvent};
    use crate::core::config::{ConfigError, WorksheetNames};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    struct Sheet {
        fail: bool,
        rows: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl SheetStore for Sheet {
        async fn append_row(&self, _worksheet: &str, cells: Vec<String>) -> Result<(), BacklogError> {
            if self.fail {
                return Err(BacklogError::Remote("503".to_string()));
            }
            self.rows.lock().unwrap().push(cells);
            Ok(())
        }

        async fn read_records(&self, _worksheet: &str) -> Result<Vec<SheetRecord>, BacklogError> {
            Ok(vec![])
        }
    }

    struct Calendar {
        fail: bool,
        inserted: Mutex<Vec<NewEvent>>,
    }

    #[async_trait]
    impl CalendarApi for Calendar {
        async fn list_events(
            &self,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
            _max_results: usize,
        ) -> Result<Vec<CalendarEvent>, CalendarError> {
            Ok(vec![])
        }

        async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
            if self.fail {
                return Err(CalendarError::Config(ConfigError::MissingCredentialSource));
            }
            self.inserted.lock().unwrap().push(event.clone());
            Ok(CalendarEvent {
                id: "evt".into(),
                summary: event.summary.clone(),
                description: event.description.clone(),
                start: None,
                html_link: Some("https://calendar.google.com/e/1".into()),
            })
        }
    }

    fn services(
        sheet_fails: bool,
        calendar_fails: bool,
    ) -> (BacklogService<Sheet>, CalendarService<Calendar>) {
        let sheet = Sheet {
            fail: sheet_fails,
            rows: Mutex::new(vec![]),
        };
        let calendar = Calendar {
            fail: calendar_fails,
            inserted: Mutex::new(vec![]),
        };
        (
            BacklogService::new(sheet, WorksheetNames::default(), chrono_tz::UTC),
            CalendarService::new(calendar, chrono_tz::UTC),
        )
    }

    fn task() -> SheetRecord {
        SheetRecord::default()
            .with(columns::TASK, "Update the menu")
            .with(columns::CATEGORY, "Kitchen")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn test_commit_books_and_logs() {
        let (backlog, calendar) = services(false, false);
        let outcome = commit_focus(&backlog, &calendar, &task(), 30, "V.P.", today())
            .await
            .unwrap();

        match outcome {
            CommitOutcome::Booked { link } => {
                assert_eq!(link.as_deref(), Some("https://calendar.google.com/e/1"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_calendar_failure_is_partial_success() {
        let (backlog, calendar) = services(false, true);
        let outcome = commit_focus(&backlog, &calendar, &task(), 60, "V.P.", today())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CommitOutcome::LoggedOnly {
                calendar_error: CalendarError::Config(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_backlog_failure_is_an_error() {
        let (backlog, calendar) = services(true, false);
        let result = commit_focus(&backlog, &calendar, &task(), 30, "V.P.", today()).await;

        assert!(matches!(result, Err(BacklogError::Remote(_))));
    }

    #[test]
    fn test_task_title_fallback() {
        assert_eq!(task_title(&SheetRecord::default()), "Untitled task");
        assert_eq!(task_title(&task()), "Update the menu");
    }
}
