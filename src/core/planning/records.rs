use std::collections::HashMap;

/// Column headers the assistant reads from the spreadsheet.
pub mod columns {
    pub const CATEGORY: &str = "Category";
    pub const TASK: &str = "Task";
    pub const STATUS: &str = "Status";
    pub const DEADLINE: &str = "Deadline";
    pub const PRIORITY: &str = "Priority";
    pub const PRIORITY_ALT: &str = "Priority(1-3)";
    pub const PROGRESS: &str = "Progress_%";

    pub const DIRECTION: &str = "Direction";
    pub const UPLIFT: &str = "Uplift_%";

    pub const REVENUE_PLAN: &str = "Revenue_plan";
    pub const REVENUE_FACT: &str = "Revenue_fact";
    pub const AVERAGE_CHECK: &str = "Average_check";
    pub const PEAK_DATES_SOLD: &str = "Peak_dates_sold_%";
}

/// One spreadsheet row keyed by its column header.
///
/// Rows are immutable snapshots fetched fresh for every request; a missing
/// cell reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRecord {
    cells: HashMap<String, String>,
}

impl SheetRecord {
    /// Pairs a header row with one data row. Short rows are padded with
    /// empty cells, extra cells without a header are dropped.
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.trim().is_empty())
            .map(|(idx, header)| {
                let value = row.get(idx).cloned().unwrap_or_default();
                (header.trim().to_string(), value)
            })
            .collect();
        Self { cells }
    }

    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// First non-empty value among several header spellings.
    pub fn get_any(&self, columns: &[&str]) -> &str {
        columns
            .iter()
            .map(|c| self.get(c))
            .find(|v| !v.trim().is_empty())
            .unwrap_or("")
    }

    #[cfg(test)]
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.cells.insert(column.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SheetRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_from_row_pads_short_rows() {
        let headers = strings(&["Task", "Status", "Deadline"]);
        let record = SheetRecord::from_row(&headers, &strings(&["Order kegs", "New"]));

        assert_eq!(record.get("Task"), "Order kegs");
        assert_eq!(record.get("Status"), "New");
        assert_eq!(record.get("Deadline"), "");
        assert_eq!(record.get("Unknown"), "");
    }

    #[test]
    fn test_from_row_skips_blank_headers() {
        let headers = strings(&["Task", "", " Status "]);
        let record = SheetRecord::from_row(&headers, &strings(&["a", "b", "c"]));

        assert_eq!(record.get("Status"), "c");
        assert_eq!(record, SheetRecord::from_iter([("Task", "a"), ("Status", "c")]));
    }

    #[test]
    fn test_get_any_prefers_first_non_empty() {
        let record = SheetRecord::default()
            .with(columns::PRIORITY, "")
            .with(columns::PRIORITY_ALT, "3");
        assert_eq!(
            record.get_any(&[columns::PRIORITY, columns::PRIORITY_ALT]),
            "3"
        );
    }
}
