// Backlog core - reading and appending rows of the task spreadsheet.
//
// The spreadsheet itself lives behind the `SheetStore` trait so this file
// stays free of HTTP details. The Google Sheets implementation is in
// `infra/google/sheets_client.rs`.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::core::config::{ConfigError, WorksheetNames};
use crate::core::planning::{columns, parse_deadline, SheetRecord};

/// Statuses that count as "still to do" in the operations sheet.
pub const ACTIVE_STATUSES: &[&str] = &["in progress", "not started", "waiting", "new"];

/// Status written for freshly captured entries.
pub const NEW_ENTRY_STATUS: &str = "New";

#[derive(Debug, Error)]
pub enum BacklogError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Spreadsheet request failed: {0}")]
    Remote(String),
}

/// Row-level access to the backlog spreadsheet.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Appends one row of cells to the end of a worksheet.
    async fn append_row(&self, worksheet: &str, cells: Vec<String>) -> Result<(), BacklogError>;

    /// Reads every data row of a worksheet, keyed by the header row.
    async fn read_records(&self, worksheet: &str) -> Result<Vec<SheetRecord>, BacklogError>;
}

pub struct BacklogService<S: SheetStore> {
    store: S,
    worksheets: WorksheetNames,
    timezone: Tz,
}

impl<S: SheetStore> BacklogService<S> {
    pub fn new(store: S, worksheets: WorksheetNames, timezone: Tz) -> Self {
        Self {
            store,
            worksheets,
            timezone,
        }
    }

    /// Appends a new entry to the inbox worksheet.
    ///
    /// Row layout: timestamp, category, text, due date, status, (empty), author.
    pub async fn append_entry(
        &self,
        text: &str,
        category: &str,
        due: &str,
        author: &str,
    ) -> Result<(), BacklogError> {
        let timestamp = Utc::now()
            .with_timezone(&self.timezone)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();

        let cells = vec![
            timestamp,
            category.to_string(),
            text.to_string(),
            due.to_string(),
            NEW_ENTRY_STATUS.to_string(),
            String::new(),
            author.to_string(),
        ];

        self.store.append_row(&self.worksheets.inbox, cells).await?;
        tracing::info!(category, due, "Appended backlog entry");
        Ok(())
    }

    /// The most recent KPI row, if the worksheet has any.
    pub async fn latest_kpi(&self) -> Result<Option<SheetRecord>, BacklogError> {
        let mut records = self.store.read_records(&self.worksheets.kpi).await?;
        Ok(records.pop())
    }

    /// Tasks still to do, soonest deadline first. Rows without a readable
    /// deadline go last, keeping their sheet order.
    pub async fn active_tasks(&self, limit: usize) -> Result<Vec<SheetRecord>, BacklogError> {
        let records = self.store.read_records(&self.worksheets.operations).await?;

        let mut active: Vec<SheetRecord> = records
            .into_iter()
            .filter(|r| is_active(r.get(columns::STATUS)))
            .collect();

        active.sort_by_key(|r| parse_deadline(r.get(columns::DEADLINE)).unwrap_or(NaiveDate::MAX));
        active.truncate(limit);
        Ok(active)
    }

    pub async fn effectiveness_rows(&self, limit: usize) -> Result<Vec<SheetRecord>, BacklogError> {
        let mut rows = self
            .store
            .read_records(&self.worksheets.effectiveness)
            .await?;
        rows.truncate(limit);
        Ok(rows)
    }
}

fn is_active(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    ACTIVE_STATUSES.contains(&status.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;

    /// In-memory store for testing
    struct MockSheetStore {
        sheets: DashMap<String, Vec<SheetRecord>>,
        appended: DashMap<String, Vec<Vec<String>>>,
    }

    impl MockSheetStore {
        fn new() -> Self {
            Self {
                sheets: DashMap::new(),
                appended: DashMap::new(),
            }
        }

        fn with_sheet(self, name: &str, rows: Vec<SheetRecord>) -> Self {
            self.sheets.insert(name.to_string(), rows);
            self
        }
    }

    #[async_trait]
    impl SheetStore for MockSheetStore {
        async fn append_row(
            &self,
            worksheet: &str,
            cells: Vec<String>,
        ) -> Result<(), BacklogError> {
            self.appended
                .entry(worksheet.to_string())
                .or_insert_with(Vec::new)
                .push(cells);
            Ok(())
        }

        async fn read_records(&self, worksheet: &str) -> Result<Vec<SheetRecord>, BacklogError> {
            self.sheets
                .get(worksheet)
                .map(|rows| rows.clone())
                .ok_or_else(|| BacklogError::Remote(format!("no worksheet {worksheet}")))
        }
    }

    fn service(store: MockSheetStore) -> BacklogService<MockSheetStore> {
        BacklogService::new(store, WorksheetNames::default(), chrono_tz::UTC)
    }

    fn op(task: &str, status: &str, deadline: &str) -> SheetRecord {
        SheetRecord::default()
            .with(columns::TASK, task)
            .with(columns::STATUS, status)
            .with(columns::DEADLINE, deadline)
    }

    fn names(records: &[SheetRecord]) -> Vec<&str> {
        records.iter().map(|r| r.get(columns::TASK)).collect()
    }

    #[tokio::test]
    async fn test_append_entry_row_layout() {
        let backlog = service(MockSheetStore::new());
        backlog
            .append_entry("Order kegs", "bar", "2026-10-20", "V.P.")
            .await
            .unwrap();

        let rows = backlog.store.appended.get("Inbox").unwrap().clone();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), 7);
        assert_eq!(row[0].len(), "2026-10-19T06:00:00".len());
        assert_eq!(&row[1..], &["bar", "Order kegs", "2026-10-20", "New", "", "V.P."]);
    }

    #[tokio::test]
    async fn test_active_tasks_filters_and_sorts() {
        let store = MockSheetStore::new().with_sheet(
            "Operations",
            vec![
                op("no deadline", "New", ""),
                op("done", "Done", "2026-10-01"),
                op("later", "In progress", "2026-12-01"),
                op("soon", "waiting", "2026-10-20"),
                op("garbled", "NOT STARTED", "someday"),
                op("cancelled", "Cancelled", "2026-10-19"),
            ],
        );
        let backlog = service(store);

        let tasks = backlog.active_tasks(50).await.unwrap();
        assert_eq!(names(&tasks), vec!["soon", "later", "no deadline", "garbled"]);

        let limited = backlog.active_tasks(2).await.unwrap();
        assert_eq!(names(&limited), vec!["soon", "later"]);
    }

    #[tokio::test]
    async fn test_latest_kpi_is_last_row() {
        let store = MockSheetStore::new().with_sheet(
            "KPI",
            vec![
                SheetRecord::default().with(columns::REVENUE_FACT, "100"),
                SheetRecord::default().with(columns::REVENUE_FACT, "250"),
            ],
        );
        let backlog = service(store);

        let kpi = backlog.latest_kpi().await.unwrap().unwrap();
        assert_eq!(kpi.get(columns::REVENUE_FACT), "250");
    }

    #[tokio::test]
    async fn test_latest_kpi_empty_sheet() {
        let backlog = service(MockSheetStore::new().with_sheet("KPI", vec![]));
        assert!(backlog.latest_kpi().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_effectiveness_rows_limit_and_errors() {
        let rows: Vec<SheetRecord> = (0..5)
            .map(|i| SheetRecord::default().with(columns::DIRECTION, i.to_string()))
            .collect();
        let backlog = service(MockSheetStore::new().with_sheet("Effectiveness", rows));
        assert_eq!(backlog.effectiveness_rows(3).await.unwrap().len(), 3);

        let missing = service(MockSheetStore::new());
        assert!(matches!(
            missing.effectiveness_rows(3).await,
            Err(BacklogError::Remote(_))
        ));
    }
}
