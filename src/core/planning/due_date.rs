// Free-text due date hints.
//
// Users type things like "order kegs #bar tomorrow" or "call supplier
// 15.03". This is deliberately substring/regex matching, not natural
// language parsing: anything we do not recognise simply has no due date.

use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

const TODAY: &[&str] = &["today", "сегодня"];
const TOMORROW: &[&str] = &["tomorrow", "завтра"];
const DAY_AFTER_TOMORROW: &[&str] = &["day after tomorrow", "послезавтра"];

fn in_days_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:\bin\s+(\d+)\s+days?\b|через\s+(\d+)\s+д)").expect("valid regex")
    })
}

/// `dd.mm` or `dd.mm.yyyy` as a standalone word, so quantities like
/// "2.5 kg" are not dates.
fn dotted_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\s)(\d{1,2})\.(\d{2})(?:\.(\d{4}))?(?:$|[\s,.!?])")
            .expect("valid regex")
    })
}

fn hashtag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#([\w-]+)").expect("valid regex"))
}

/// Resolves a due date hint relative to `today`.
///
/// Returns an ISO `YYYY-MM-DD` string, or an empty string when no date is
/// recognised.
pub fn resolve_due(text: &str, today: NaiveDate) -> String {
    resolve_due_date(text, today)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn resolve_due_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if mentions(TODAY) {
        return Some(today);
    }
    // Checked before TOMORROW on purpose: "day after tomorrow" contains
    // "tomorrow" and "послезавтра" contains "завтра".
    if mentions(DAY_AFTER_TOMORROW) {
        return Some(today + Duration::days(2));
    }
    if mentions(TOMORROW) {
        return Some(today + Duration::days(1));
    }

    if let Some(caps) = in_days_pattern().captures(&text) {
        let days = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse::<i64>().ok());
        if let Some(date) = days
            .and_then(Duration::try_days)
            .and_then(|offset| today.checked_add_signed(offset))
        {
            return Some(date);
        }
    }

    dotted_date_pattern()
        .captures_iter(&text)
        .find_map(|caps| {
            let day = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
            let year = match caps.get(3) {
                Some(y) => y.as_str().parse::<i32>().ok()?,
                None => chrono::Datelike::year(&today),
            };
            NaiveDate::from_ymd_opt(year, month, day)
        })
}

/// A backlog entry typed by the user while in capture mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEntry {
    pub text: String,
    pub category: String,
    pub due: String,
}

/// Splits a captured message into text, `#category` and due date.
pub fn parse_capture(text: &str, today: NaiveDate) -> CaptureEntry {
    let text = text.trim();
    let category = hashtag_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    CaptureEntry {
        text: text.to_string(),
        category,
        due: resolve_due(text, today),
    }
}
