// Task prioritisation.
//
// The weights below are the ones the backlog has always been ranked with.
// Keep them as they are; changing them changes what people are told to do
// first.

use chrono::NaiveDate;

use super::records::{columns, SheetRecord};

pub const DEFAULT_PRIORITY: f64 = 2.0;
pub const DEFAULT_PROGRESS: f64 = 0.0;
/// Days-left value used when a task has no usable deadline.
pub const HORIZON_DAYS: i64 = 30;
pub const DEFAULT_FOCUS_SIZE: usize = 3;

/// Parses a spreadsheet number: tolerates a leading `+`, a trailing `%`,
/// surrounding whitespace and a comma decimal separator.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .trim_start_matches('+')
        .trim_end_matches('%')
        .trim()
        .replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Days until the deadline, clamped at zero for overdue tasks.
pub fn days_left(task: &SheetRecord, today: NaiveDate) -> i64 {
    parse_deadline(task.get(columns::DEADLINE))
        .map(|deadline| (deadline - today).num_days().max(0))
        .unwrap_or(HORIZON_DAYS)
}

/// Urgency contribution of the deadline. Non-increasing in `days_left`.
pub fn urgency(days_left: i64) -> f64 {
    let days = days_left.clamp(0, HORIZON_DAYS);
    (HORIZON_DAYS - days) as f64 / 10.0
}

/// Best uplift among effectiveness rows whose direction mentions the
/// task's category.
pub fn category_effect(task: &SheetRecord, effectiveness: &[SheetRecord]) -> f64 {
    let category = task.get(columns::CATEGORY).to_lowercase();

    effectiveness
        .iter()
        .filter(|row| row.get(columns::DIRECTION).to_lowercase().contains(&category))
        .filter_map(|row| parse_number(row.get(columns::UPLIFT)))
        .fold(0.0, f64::max)
}

/// Numeric urgency score for one backlog entry. Never fails: malformed
/// fields fall back to their defaults.
pub fn score_task(task: &SheetRecord, effectiveness: &[SheetRecord], today: NaiveDate) -> f64 {
    let priority = parse_number(task.get_any(&[columns::PRIORITY, columns::PRIORITY_ALT]))
        .unwrap_or(DEFAULT_PRIORITY);
    let progress = parse_number(task.get(columns::PROGRESS)).unwrap_or(DEFAULT_PROGRESS);
    let effect = category_effect(task, effectiveness);

    priority * 2.0 + effect / 5.0 + (100.0 - progress) / 50.0 + urgency(days_left(task, today))
}

/// The `top` highest scoring tasks, best first. Ties keep their input order.
pub fn pick_next(
    tasks: &[SheetRecord],
    effectiveness: &[SheetRecord],
    top: usize,
    today: NaiveDate,
) -> Vec<SheetRecord> {
    let mut ranked: Vec<(f64, &SheetRecord)> = tasks
        .iter()
        .map(|task| (score_task(task, effectiveness, today), task))
        .collect();

    // sort_by is stable, so equal scores stay in backlog order.
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    ranked
        .into_iter()
        .take(top)
        .map(|(_, task)| task.clone())
        .collect()
}
