// Google Sheets API v4 adapter for the backlog spreadsheet.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use super::{GoogleApiError, ServiceAccountAuth};
use crate::core::backlog::{BacklogError, SheetStore};
use crate::core::config::{require, SHEET_ID_VAR};
use crate::core::planning::SheetRecord;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct GoogleSheetsClient {
    client: Client,
    auth: ServiceAccountAuth,
    sheet_id: Option<String>,
}

impl GoogleSheetsClient {
    pub fn new(sheet_id: Option<String>, credential_source: Option<String>) -> Self {
        Self {
            client: Client::new(),
            auth: ServiceAccountAuth::new(credential_source, SHEETS_SCOPE),
            sheet_id,
        }
    }

    /// `.../spreadsheets/{id}/values/{range}{suffix}` with every segment escaped.
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, GoogleApiError> {
        let sheet_id = require(self.sheet_id.as_deref(), SHEET_ID_VAR)?;
        let last = format!("{}{}", range, suffix);
        let mut url = Url::parse(SHEETS_API).map_err(|e| GoogleApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::InvalidUrl(SHEETS_API.to_string()))?
            .pop_if_empty()
            .extend([sheet_id, "values", last.as_str()]);
        Ok(url)
    }

    async fn append(&self, worksheet: &str, cells: Vec<String>) -> Result<(), GoogleApiError> {
        let url = self.values_url(worksheet, ":append")?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [cells] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleApiError::from_response(response).await);
        }
        Ok(())
    }

    async fn read(&self, worksheet: &str) -> Result<Vec<SheetRecord>, GoogleApiError> {
        let url = self.values_url(worksheet, "")?;
        let token = self.auth.access_token().await?;

        let response = self.client.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(GoogleApiError::from_response(response).await);
        }

        let range: ValueRange = response.json().await?;
        Ok(records_from_values(range.values))
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn append_row(&self, worksheet: &str, cells: Vec<String>) -> Result<(), BacklogError> {
        self.append(worksheet, cells).await.map_err(|e| {
            tracing::warn!(worksheet, error = %e, "Sheets append failed");
            BacklogError::from(e)
        })
    }

    async fn read_records(&self, worksheet: &str) -> Result<Vec<SheetRecord>, BacklogError> {
        self.read(worksheet).await.map_err(|e| {
            tracing::warn!(worksheet, error = %e, "Sheets read failed");
            BacklogError::from(e)
        })
    }
}

/// First row is the header; blank rows are skipped.
fn records_from_values(values: Vec<Vec<String>>) -> Vec<SheetRecord> {
    let mut rows = values.into_iter();
    let headers = match rows.next() {
        Some(headers) => headers,
        None => return Vec::new(),
    };

    rows.filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| SheetRecord::from_row(&headers, &row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigError;
    use crate::core::planning::columns;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_records_from_values() {
        let values = vec![
            row(&["Task", "Status", "Deadline"]),
            row(&["Order kegs", "New"]),
            row(&["", "", ""]),
            row(&["Fix the tap", "Waiting", "2026-10-21"]),
        ];

        let records = records_from_values(values);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(columns::TASK), "Order kegs");
        assert_eq!(records[0].get(columns::DEADLINE), "");
        assert_eq!(records[1].get(columns::STATUS), "Waiting");
    }

    #[test]
    fn test_empty_sheet_has_no_records() {
        assert!(records_from_values(vec![]).is_empty());
        assert!(records_from_values(vec![row(&["Task"])]).is_empty());
    }

    #[test]
    fn test_values_url_escapes_worksheet() {
        let client = GoogleSheetsClient::new(Some("sheet123".to_string()), None);
        let url = client.values_url("My Inbox", ":append").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet123/values/My%20Inbox:append"
        );
    }

    #[tokio::test]
    async fn test_missing_sheet_id() {
        let client = GoogleSheetsClient::new(None, None);
        let err = client.read_records("Inbox").await.unwrap_err();
        assert!(matches!(
            err,
            BacklogError::Config(ConfigError::MissingSetting("GOOGLE_SHEET_ID"))
        ));
    }
}
