use chrono::NaiveDate;
use serde_json::Value;

use crate::calendar::{CalendarDay, CalendarMonth};
use crate::clock::FixedClock;
use crate::ipc::types::AppState;

pub fn parse_calendar(params: &Value) -> Result<Vec<CalendarMonth>, String> {
    let Some(raw) = params.get("calendar") else {
        return Err("missing params.calendar".to_string());
    };
    serde_json::from_value(raw.clone()).map_err(|e| format!("calendar: {}", e))
}

pub fn parse_opt_day(params: &Value, key: &str) -> Result<Option<CalendarDay>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| format!("{}: {}", key, e)),
    }
}

pub fn parse_required_day(params: &Value, key: &str) -> Result<CalendarDay, String> {
    parse_opt_day(params, key)?.ok_or_else(|| format!("missing params.{}", key))
}

pub fn parse_opt_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

/// Time source for one request: the state clock, unless the request pins
/// `today` (ISO `YYYY-MM-DD`). The override replaces the original app's
/// date-constructor mocking for debugging and tests.
pub fn request_clock(state: &AppState, params: &Value) -> Result<FixedClock, String> {
    let clock = state.clock.as_ref();
    match params.get("today") {
        None => Ok(FixedClock::at(clock.today(), clock.now_millis())),
        Some(v) if v.is_null() => Ok(FixedClock::at(clock.today(), clock.now_millis())),
        Some(v) => {
            let text = v.as_str().ok_or("today must be a string")?;
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| "today must be YYYY-MM-DD".to_string())?;
            Ok(FixedClock::at(date, clock.now_millis()))
        }
    }
}
