use serde_json::json;

use crate::calendar::locate_last_working_day;
use crate::clock::Clock;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_calendar, parse_opt_day, parse_opt_str, request_clock};
use crate::ipc::types::{AppState, Request};
use crate::wrapped::semester_id;

fn handle_last_working_day(req: &Request) -> serde_json::Value {
    let calendar = match parse_calendar(&req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };

    match locate_last_working_day(&calendar) {
        Some((day, month)) => ok(&req.id, json!({ "lastWorkingDay": day, "month": month })),
        None => ok(&req.id, json!({ "lastWorkingDay": null, "month": null })),
    }
}

fn handle_semester_id(state: &mut AppState, req: &Request) -> serde_json::Value {
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let last_working_day = match parse_opt_day(&req.params, "lastWorkingDay") {
        Ok(d) => d,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let month = parse_opt_str(&req.params, "month");

    let id = semester_id(last_working_day.as_ref(), month.as_deref(), clock.today());
    ok(&req.id, json!({ "semesterId": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calendar.lastWorkingDay" => Some(handle_last_working_day(req)),
        "calendar.semesterId" => Some(handle_semester_id(state, req)),
        _ => None,
    }
}
