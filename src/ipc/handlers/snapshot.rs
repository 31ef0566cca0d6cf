use serde_json::json;
use std::path::PathBuf;

use crate::archive;
use crate::clock::Clock;
use crate::db::SqliteStore;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_opt_str, parse_required_day, request_clock};
use crate::ipc::types::{AppState, Request};
use crate::records::WrappedData;
use crate::snapshot::{
    read_snapshot, read_snapshot_entry, write_snapshot, KvStore, SnapshotEntry, SNAPSHOT_KEY,
};
use crate::wrapped::semester_id;

fn handle_write(state: &mut AppState, req: &Request) -> serde_json::Value {
    let last_working_day = match parse_required_day(&req.params, "lastWorkingDay") {
        Ok(d) => d,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let month = parse_opt_str(&req.params, "month");
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let data: WrappedData = match serde_json::from_value(req.params.clone()) {
        Ok(d) => d,
        Err(e) => return err(&req.id, "bad_params", format!("data: {}", e)),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let mut store = SqliteStore::new(conn);
    let written = write_snapshot(
        &mut store,
        &clock,
        &data,
        &last_working_day,
        month.as_deref(),
    );
    ok(
        &req.id,
        json!({
            "written": written,
            "semesterId": semester_id(Some(&last_working_day), month.as_deref(), clock.today()),
        }),
    )
}

fn handle_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    let last_working_day = match parse_required_day(&req.params, "lastWorkingDay") {
        Ok(d) => d,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let month = parse_opt_str(&req.params, "month");
    let clock = match request_clock(state, &req.params) {
        Ok(c) => c,
        Err(m) => return err(&req.id, "bad_params", m),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let store = SqliteStore::new(conn);
    match read_snapshot(&store, &clock, &last_working_day, month.as_deref()) {
        Some(data) => ok(&req.id, json!({ "hit": true, "data": data })),
        None => ok(&req.id, json!({ "hit": false, "data": null })),
    }
}

fn handle_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match parse_opt_str(&req.params, "outPath") {
        Some(p) => PathBuf::from(p),
        None => return err(&req.id, "bad_params", "missing params.outPath"),
    };
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let store = SqliteStore::new(conn);
    let Some(entry) = read_snapshot_entry(&store) else {
        return err(&req.id, "no_snapshot", "no snapshot stored for this workspace");
    };
    let snapshot_json = match serde_json::to_string(&entry) {
        Ok(text) => text,
        Err(e) => return err(&req.id, "internal", format!("snapshot serialize: {}", e)),
    };

    match archive::export_snapshot_bundle(&snapshot_json, &workspace, &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormat": summary.bundle_format,
                "exportId": summary.export_id,
                "entryCount": summary.entry_count,
                "outPath": out_path.to_string_lossy(),
            }),
        ),
        Err(e) => err(&req.id, "export_failed", format!("{e:#}")),
    }
}

fn handle_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match parse_opt_str(&req.params, "inPath") {
        Some(p) => PathBuf::from(p),
        None => return err(&req.id, "bad_params", "missing params.inPath"),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first");
    };

    let summary = match archive::import_snapshot_bundle(&in_path) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "import_failed", format!("{e:#}")),
    };
    let entry: SnapshotEntry = match serde_json::from_str(&summary.snapshot_json) {
        Ok(e) => e,
        Err(e) => {
            return err(
                &req.id,
                "import_failed",
                format!("bundled snapshot has the wrong shape: {}", e),
            )
        }
    };

    let mut store = SqliteStore::new(conn);
    if let Err(e) = store.set(SNAPSHOT_KEY, &summary.snapshot_json) {
        return err(&req.id, "db_write_failed", format!("{e:#}"));
    }

    ok(
        &req.id,
        json!({
            "bundleFormatDetected": summary.bundle_format_detected,
            "semesterId": entry.semester_id,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "snapshot.write" => Some(handle_write(state, req)),
        "snapshot.read" => Some(handle_read(state, req)),
        "snapshot.exportBundle" => Some(handle_export_bundle(state, req)),
        "snapshot.importBundle" => Some(handle_import_bundle(state, req)),
        _ => None,
    }
}
