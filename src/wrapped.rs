use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::calendar::{
    locate_last_working_day, month_number, parse_calendar_date, resolve_year_suffix,
    split_month_label, CalendarDay, CalendarMonth,
};

/// The Wrapped retrospective stays unlockable for this many days starting
/// on the last working day, both endpoints included.
pub const AVAILABILITY_WINDOW_DAYS: i64 = 30;

/// Verdict on whether the Wrapped retrospective can be shown today.
///
/// Recomputed on every query; never stored. Ambiguous calendar data always
/// degrades to `is_available: false` with fewer populated fields, since bad
/// input must not unlock the feature.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedAvailability {
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_last_working_day: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_working_day: Option<CalendarDay>,
}

impl WrappedAvailability {
    fn unavailable() -> Self {
        Self::default()
    }
}

/// Decide whether Wrapped is available on `today`, and how far the window
/// has progressed.
///
/// Available exactly when `today` lies in the closed interval
/// `[last working day, last working day + 30]`. Before the window opens,
/// only the countdown to the last working day is reported; inside it, the
/// countdown is zero and the remaining window length is reported; past it,
/// neither is.
pub fn wrapped_availability(calendar: &[CalendarMonth], today: NaiveDate) -> WrappedAvailability {
    if calendar.is_empty() {
        return WrappedAvailability::unavailable();
    }

    let Some((last_working_day, month_label)) = locate_last_working_day(calendar) else {
        return WrappedAvailability::unavailable();
    };

    let Some(last_working_date) =
        parse_calendar_date(&last_working_day.date, Some(month_label), today.year())
    else {
        return WrappedAvailability::unavailable();
    };

    let window_end = last_working_date + Duration::days(AVAILABILITY_WINDOW_DAYS);
    let is_available = today >= last_working_date && today <= window_end;

    let mut days_remaining = None;
    let mut days_until_last_working_day = None;
    if today < last_working_date {
        days_until_last_working_day = Some((last_working_date - today).num_days());
    } else if is_available {
        days_until_last_working_day = Some(0);
        days_remaining = Some((window_end - today).num_days());
    }

    WrappedAvailability {
        is_available,
        days_remaining,
        days_until_last_working_day,
        last_working_day: Some(last_working_day.clone()),
    }
}

/// Coarse half-year partition key for the academic term, `"<year>-<half>"`.
///
/// Total by construction: every unparsable input falls back to `today`.
/// Used to keep a cached snapshot from one term out of the next.
pub fn semester_id(
    last_working_day: Option<&CalendarDay>,
    month_label: Option<&str>,
    today: NaiveDate,
) -> String {
    let (year, month) = match last_working_day {
        Some(day) if day.date.contains('-') => {
            let parts: Vec<u32> = day
                .date
                .split('-')
                .filter_map(|p| p.trim().parse().ok())
                .collect();
            if parts.len() == 3 {
                (parts[2] as i32, parts[1])
            } else {
                (today.year(), today.month())
            }
        }
        Some(_) => match month_label {
            Some(label) => {
                let (name, suffix) = split_month_label(label);
                // An unknown month name falls back to the current month;
                // a valid 2-digit suffix still pins the year.
                let month = month_number(name).unwrap_or_else(|| today.month());
                let year = resolve_year_suffix(suffix, today.year());
                (year, month)
            }
            None => (today.year(), today.month()),
        },
        None => (today.year(), today.month()),
    };

    let half = if month <= 6 { "1" } else { "2" };
    format!("{}-{}", year, half)
}
