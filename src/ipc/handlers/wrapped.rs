use serde_json::json;

use crate::calendar::locate_last_working_day;
use crate::clock::Clock;
use crate::db::SqliteStore;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_calendar, request_clock};
use crate::ipc::types::{AppState, Request};
use crate::records::WrappedData;
use crate::snapshot::{has_viewed, mark_viewed, read_snapshot, write_snapshot};
use crate::wrapped::wrapped_availability;

fn handle_availability(state: &mut AppState, req: &Request) -> serde_json::Value {
    let calendar = match parse_calendar(&req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };

    let verdict = wrapped_availability(&calendar, clock.today());
    match serde_json::to_value(&verdict) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "internal", format!("verdict serialize: {}", e)),
    }
}

/// The full resolution flow behind the Wrapped entry point: verdict first,
/// then a same-semester snapshot if one exists, otherwise the live data,
/// snapshotting it while the availability window is open.
fn handle_resolve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let calendar = match parse_calendar(&req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let live: WrappedData = match serde_json::from_value(req.params.clone()) {
        Ok(d) => d,
        Err(e) => return err(&req.id, "bad_params", format!("data: {}", e)),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let verdict = wrapped_availability(&calendar, clock.today());
    let verdict_json = match serde_json::to_value(&verdict) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "internal", format!("verdict serialize: {}", e)),
    };

    let Some((last_working_day, month_label)) = locate_last_working_day(&calendar) else {
        return ok(
            &req.id,
            json!({
                "availability": verdict_json,
                "dataLoaded": false,
                "source": null,
                "snapshotWritten": false,
            }),
        );
    };

    let mut store = SqliteStore::new(conn);
    if let Some(cached) = read_snapshot(&store, &clock, last_working_day, Some(month_label)) {
        return ok(
            &req.id,
            json!({
                "availability": verdict_json,
                "data": cached,
                "dataLoaded": true,
                "source": "cache",
                "snapshotWritten": false,
            }),
        );
    }

    // No snapshot yet: serve live data, and take the semester snapshot
    // once the window is open (i.e. the last working day has arrived).
    let snapshot_written = verdict.is_available
        && write_snapshot(&mut store, &clock, &live, last_working_day, Some(month_label));

    ok(
        &req.id,
        json!({
            "availability": verdict_json,
            "data": live,
            "dataLoaded": true,
            "source": "live",
            "snapshotWritten": snapshot_written,
        }),
    )
}

fn handle_view_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let is_available = req
        .params
        .get("isAvailable")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let store = SqliteStore::new(conn);
    let viewed = has_viewed(&store, &clock);
    ok(
        &req.id,
        json!({
            "hasViewed": viewed,
            "shouldPrompt": is_available && !viewed,
        }),
    )
}

fn handle_mark_viewed(state: &mut AppState, req: &Request) -> serde_json::Value {
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let mut store = SqliteStore::new(conn);
    match mark_viewed(&mut store, &clock) {
        Some(record) => ok(
            &req.id,
            json!({
                "recorded": true,
                "semesterId": record.semester_id,
                "viewedAt": record.viewed_at,
            }),
        ),
        None => ok(&req.id, json!({ "recorded": false })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "wrapped.availability" => Some(handle_availability(state, req)),
        "wrapped.resolve" => Some(handle_resolve(state, req)),
        "wrapped.viewStatus" => Some(handle_view_status(state, req)),
        "wrapped.markViewed" => Some(handle_mark_viewed(state, req)),
        _ => None,
    }
}
