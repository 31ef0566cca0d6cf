use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day row of the academia planner as served by the college portal.
/// `date` is either a full `DD-MM-YYYY` token or a bare day-of-month;
/// `event` carries free-text markers such as "Last Working Day".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub day_order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    /// Month label as published, e.g. "May'25".
    pub month: String,
    pub days: Vec<CalendarDay>,
}

/// Event substrings that mark the end of instruction explicitly.
const LAST_DAY_MARKERS: [&str; 3] = ["Last Working Day", "End of Semester", "Last Day of Classes"];

/// Event substrings that mark the start of the examination period. The day
/// *before* one of these is treated as the last working day.
const EXAM_START_MARKERS: [&str; 3] = [
    "Examination Begins",
    "Final Exams Begin",
    "End of Teaching Period",
];

fn event_matches(day: &CalendarDay, markers: &[&str]) -> bool {
    day.event
        .as_deref()
        .map(|e| markers.iter().any(|m| e.contains(m)))
        .unwrap_or(false)
}

/// Locate the semester's last working day in the published calendar.
///
/// Policy, first match wins, months and days scanned in supplied order:
/// 1. a day whose event names the end of instruction outright;
/// 2. else the day positionally before the first exam-period marker in the
///    same month (the marker day itself when it is listed first). This is
///    an index lookup, not date arithmetic, so it relies on the portal
///    listing days chronologically;
/// 3. else the last listed day of the last month, as a best guess.
pub fn locate_last_working_day(calendar: &[CalendarMonth]) -> Option<(&CalendarDay, &str)> {
    for month in calendar {
        for day in &month.days {
            if event_matches(day, &LAST_DAY_MARKERS) {
                return Some((day, month.month.as_str()));
            }
        }
    }

    for month in calendar {
        for (idx, day) in month.days.iter().enumerate() {
            if event_matches(day, &EXAM_START_MARKERS) {
                let picked = if idx > 0 { &month.days[idx - 1] } else { day };
                return Some((picked, month.month.as_str()));
            }
        }
    }

    let last_month = calendar.last()?;
    last_month
        .days
        .last()
        .map(|day| (day, last_month.month.as_str()))
}

/// 1-based month number for a full English month name, case-insensitive.
pub fn month_number(name: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let needle = name.trim().to_ascii_lowercase();
    NAMES
        .iter()
        .position(|n| *n == needle)
        .map(|idx| idx as u32 + 1)
}

/// Split a month label like "May'25" into its name and optional 2-digit
/// year suffix.
pub fn split_month_label(label: &str) -> (&str, Option<&str>) {
    match label.split_once('\'') {
        Some((name, suffix)) => (name, Some(suffix)),
        None => (label, None),
    }
}

/// Resolve a 2-digit year suffix against the 2000s; anything else falls
/// back to the supplied year.
pub fn resolve_year_suffix(suffix: Option<&str>, fallback_year: i32) -> i32 {
    suffix
        .and_then(|s| s.trim().parse::<i32>().ok())
        .filter(|y| (0..=99).contains(y))
        .map(|y| 2000 + y)
        .unwrap_or(fallback_year)
}

/// Parse a calendar date token into a concrete date.
///
/// A token containing `-` is read as `DD-MM-YYYY`. A bare day number needs
/// the month label for context; an unknown month name fails. `None` means
/// the date cannot be determined; callers treat that as "availability
/// cannot be determined", never as an error.
pub fn parse_calendar_date(
    token: &str,
    month_label: Option<&str>,
    fallback_year: i32,
) -> Option<NaiveDate> {
    if token.contains('-') {
        let mut parts = token.split('-');
        let day: u32 = parts.next()?.trim().parse().ok()?;
        let month: u32 = parts.next()?.trim().parse().ok()?;
        let year: i32 = parts.next()?.trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let label = month_label?;
    let day: u32 = token.trim().parse().ok()?;
    let (name, suffix) = split_month_label(label);
    let month = month_number(name)?;
    let year = resolve_year_suffix(suffix, fallback_year);
    NaiveDate::from_ymd_opt(year, month, day)
}
