use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_classprod");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn classprod");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: Value,
) -> Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(true), "{value}");
    value["result"].clone()
}

fn calendar() -> Value {
    json!([
        {
            "month": "May'25",
            "days": [
                { "date": "01-05-2025", "day": "Thursday", "dayOrder": "1" },
                { "date": "06-05-2025", "day": "Tuesday", "event": "Last Working Day", "dayOrder": "2" }
            ]
        }
    ])
}

fn marks(scored: &str) -> Value {
    json!([
        {
            "courseCode": "CSE101",
            "courseName": "Introduction to Computer Science",
            "courseType": "Theory",
            "overall": { "scored": scored, "total": "100" },
            "testPerformance": []
        }
    ])
}

#[test]
fn resolve_snapshots_once_and_then_serves_the_snapshot() {
    let workspace = temp_dir("classpro-resolve");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Inside the window, no snapshot yet: live data is served and frozen.
    let first = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.resolve",
        json!({
            "calendar": calendar(),
            "marks": marks("82"),
            "courses": [],
            "attendance": [],
            "today": "2025-05-14"
        }),
    );
    assert_eq!(first["availability"]["isAvailable"], json!(true));
    assert_eq!(first["source"], json!("live"));
    assert_eq!(first["snapshotWritten"], json!(true));
    assert_eq!(first["dataLoaded"], json!(true));
    assert_eq!(first["data"]["marks"][0]["overall"]["scored"], json!("82"));

    // Marks changed upstream afterwards; the frozen snapshot wins.
    let second = request(
        &mut stdin,
        &mut reader,
        "3",
        "wrapped.resolve",
        json!({
            "calendar": calendar(),
            "marks": marks("95"),
            "courses": [],
            "attendance": [],
            "today": "2025-05-20"
        }),
    );
    assert_eq!(second["source"], json!("cache"));
    assert_eq!(second["snapshotWritten"], json!(false));
    assert_eq!(second["data"]["marks"][0]["overall"]["scored"], json!("82"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn resolve_before_the_window_serves_live_without_snapshotting() {
    let workspace = temp_dir("classpro-resolve-early");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let early = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.resolve",
        json!({
            "calendar": calendar(),
            "marks": marks("70"),
            "courses": [],
            "attendance": [],
            "today": "2025-05-02"
        }),
    );
    assert_eq!(early["availability"]["isAvailable"], json!(false));
    assert_eq!(early["availability"]["daysUntilLastWorkingDay"], json!(4));
    assert_eq!(early["source"], json!("live"));
    assert_eq!(early["snapshotWritten"], json!(false));

    // Nothing was frozen, so fresher live data still flows through.
    let later = request(
        &mut stdin,
        &mut reader,
        "3",
        "wrapped.resolve",
        json!({
            "calendar": calendar(),
            "marks": marks("75"),
            "courses": [],
            "attendance": [],
            "today": "2025-05-03"
        }),
    );
    assert_eq!(later["data"]["marks"][0]["overall"]["scored"], json!("75"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn resolve_with_an_unreadable_calendar_reports_no_data() {
    let workspace = temp_dir("classpro-resolve-empty");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let resolved = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.resolve",
        json!({
            "calendar": [],
            "marks": marks("82"),
            "courses": [],
            "attendance": [],
            "today": "2025-05-14"
        }),
    );
    assert_eq!(resolved["availability"]["isAvailable"], json!(false));
    assert_eq!(resolved["dataLoaded"], json!(false));
    assert_eq!(resolved["source"], json!(null));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn view_state_prompts_once_per_semester() {
    let workspace = temp_dir("classpro-viewstate");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let status = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.viewStatus",
        json!({ "isAvailable": true, "today": "2025-05-14" }),
    );
    assert_eq!(status["hasViewed"], json!(false));
    assert_eq!(status["shouldPrompt"], json!(true));

    let recorded = request(
        &mut stdin,
        &mut reader,
        "3",
        "wrapped.markViewed",
        json!({ "today": "2025-05-14" }),
    );
    assert_eq!(recorded["recorded"], json!(true));
    assert_eq!(recorded["semesterId"], json!("2025-1"));

    let status = request(
        &mut stdin,
        &mut reader,
        "4",
        "wrapped.viewStatus",
        json!({ "isAvailable": true, "today": "2025-05-20" }),
    );
    assert_eq!(status["hasViewed"], json!(true));
    assert_eq!(status["shouldPrompt"], json!(false));

    // A new semester re-arms the prompt.
    let status = request(
        &mut stdin,
        &mut reader,
        "5",
        "wrapped.viewStatus",
        json!({ "isAvailable": true, "today": "2025-11-20" }),
    );
    assert_eq!(status["hasViewed"], json!(false));
    assert_eq!(status["shouldPrompt"], json!(true));

    // Not available: never prompt, viewed or not.
    let status = request(
        &mut stdin,
        &mut reader,
        "6",
        "wrapped.viewStatus",
        json!({ "isAvailable": false, "today": "2025-11-21" }),
    );
    assert_eq!(status["shouldPrompt"], json!(false));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
