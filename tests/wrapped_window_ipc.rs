use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

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
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(true));
    value["result"].clone()
}

fn may_calendar(last_working_date: &str) -> Value {
    json!([
        {
            "month": "May'25",
            "days": [
                { "date": "01-05-2025", "day": "Thursday", "dayOrder": "1" },
                { "date": last_working_date, "day": "Saturday", "event": "Last Working Day", "dayOrder": "2" }
            ]
        }
    ])
}

#[test]
fn availability_window_over_the_wire() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    // Empty calendar: bare negative verdict.
    let verdict = request(
        &mut stdin,
        &mut reader,
        "1",
        "wrapped.availability",
        json!({ "calendar": [], "today": "2025-05-14" }),
    );
    assert_eq!(verdict["isAvailable"], json!(false));
    assert!(verdict.get("daysRemaining").is_none());
    assert!(verdict.get("daysUntilLastWorkingDay").is_none());
    assert!(verdict.get("lastWorkingDay").is_none());

    // Three days ahead of the last working day.
    let verdict = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.availability",
        json!({ "calendar": may_calendar("17-05-2025"), "today": "2025-05-14" }),
    );
    assert_eq!(verdict["isAvailable"], json!(false));
    assert_eq!(verdict["daysUntilLastWorkingDay"], json!(3));
    assert!(verdict.get("daysRemaining").is_none());
    assert_eq!(verdict["lastWorkingDay"]["date"], json!("17-05-2025"));

    // Eight days into the window.
    let verdict = request(
        &mut stdin,
        &mut reader,
        "3",
        "wrapped.availability",
        json!({ "calendar": may_calendar("06-05-2025"), "today": "2025-05-14" }),
    );
    assert_eq!(verdict["isAvailable"], json!(true));
    assert_eq!(verdict["daysUntilLastWorkingDay"], json!(0));
    assert_eq!(verdict["daysRemaining"], json!(22));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn window_boundary_at_day_thirty() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let calendar = json!([
        {
            "month": "April'25",
            "days": [
                { "date": "20-04-2025", "day": "Sunday", "event": "Last Working Day", "dayOrder": "1" }
            ]
        }
    ]);

    let on_boundary = request(
        &mut stdin,
        &mut reader,
        "1",
        "wrapped.availability",
        json!({ "calendar": calendar.clone(), "today": "2025-05-20" }),
    );
    assert_eq!(on_boundary["isAvailable"], json!(true));
    assert_eq!(on_boundary["daysRemaining"], json!(0));

    let past_boundary = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.availability",
        json!({ "calendar": calendar, "today": "2025-05-21" }),
    );
    assert_eq!(past_boundary["isAvailable"], json!(false));
    assert!(past_boundary.get("daysRemaining").is_none());
    assert!(past_boundary.get("daysUntilLastWorkingDay").is_none());
    // The located day is still reported on a closed-window verdict.
    assert_eq!(past_boundary["lastWorkingDay"]["date"], json!("20-04-2025"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn exam_marker_drives_the_window_when_no_explicit_day_exists() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let calendar = json!([
        {
            "month": "May'25",
            "days": [
                { "date": "08-05-2025", "day": "Thursday", "dayOrder": "1" },
                { "date": "09-05-2025", "day": "Friday", "event": "Examination Begins", "dayOrder": "2" }
            ]
        }
    ]);

    let located = request(
        &mut stdin,
        &mut reader,
        "1",
        "calendar.lastWorkingDay",
        json!({ "calendar": calendar.clone() }),
    );
    assert_eq!(located["lastWorkingDay"]["date"], json!("08-05-2025"));
    assert_eq!(located["month"], json!("May'25"));

    let verdict = request(
        &mut stdin,
        &mut reader,
        "2",
        "wrapped.availability",
        json!({ "calendar": calendar, "today": "2025-05-14" }),
    );
    assert_eq!(verdict["isAvailable"], json!(true));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn semester_id_over_the_wire() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let june = request(
        &mut stdin,
        &mut reader,
        "1",
        "calendar.semesterId",
        json!({ "lastWorkingDay": { "date": "30-06-2025", "dayOrder": "1" } }),
    );
    assert_eq!(june["semesterId"], json!("2025-1"));

    let july = request(
        &mut stdin,
        &mut reader,
        "2",
        "calendar.semesterId",
        json!({ "lastWorkingDay": { "date": "01-07-2025", "dayOrder": "1" } }),
    );
    assert_eq!(july["semesterId"], json!("2025-2"));

    // No inputs at all: the pinned `today` decides.
    let fallback = request(
        &mut stdin,
        &mut reader,
        "3",
        "calendar.semesterId",
        json!({ "today": "2025-11-03" }),
    );
    assert_eq!(fallback["semesterId"], json!("2025-2"));

    drop(stdin);
    let _ = child.wait();
}
