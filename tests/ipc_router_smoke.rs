use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
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

fn spawn_sidecar(store: &Path) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .arg("--store")
        .arg(store)
        .env_remove("ROSTERD_STORE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

#[test]
fn sidecar_drives_the_roster_end_to_end() {
    let dir = temp_dir("rosterd-ipc");
    let store = dir.join("resources").join("studentMarks.txt");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&store);

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["studentCount"], 0);

    let alice = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "code": "1001", "name": "Alice", "marks": ["18", "19", "20"], "exam": "90" }),
    );
    assert_eq!(alice["student"]["grade"], "A");
    assert_eq!(alice["student"]["total"], 147);

    let bob = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "code": 1002, "name": "Bob", "marks": [5, 5, 5], "exam": 40 }),
    );
    assert_eq!(bob["student"]["grade"], "F");

    let dup = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "code": "1003", "name": "bob", "marks": ["1", "1", "1"], "exam": "1" }),
    );
    assert_eq!(dup["ok"], false);
    assert_eq!(error_code(&dup), "validation_failed");

    let bad_marks = request(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "code": "1003", "name": "Carol", "marks": ["1", "1"], "exam": "1" }),
    );
    assert_eq!(error_code(&bad_marks), "bad_params");

    let avg = request_ok(&mut stdin, &mut reader, "6", "stats.average", json!({}));
    assert_eq!(avg["average"], 63.13);
    assert_eq!(avg["count"], 2);

    let high = request_ok(&mut stdin, &mut reader, "7", "stats.highest", json!({}));
    assert_eq!(high["student"]["name"], "Alice");
    let low = request_ok(&mut stdin, &mut reader, "8", "stats.lowest", json!({}));
    assert_eq!(low["student"]["name"], "Bob");

    let failed = request(
        &mut stdin,
        &mut reader,
        "9",
        "students.update",
        json!({ "identifier": "1002", "field": "Exam", "value": "150" }),
    );
    assert_eq!(error_code(&failed), "validation_failed");
    assert_eq!(failed["error"]["message"], "Exam must be 0-100");
    let found = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.find",
        json!({ "identifier": "1002" }),
    );
    assert_eq!(found["student"]["examMark"], 40);

    let bad_field = request(
        &mut stdin,
        &mut reader,
        "11",
        "students.update",
        json!({ "identifier": "1002", "field": "Grade", "value": "A" }),
    );
    assert_eq!(error_code(&bad_field), "bad_params");

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "students.update",
        json!({ "identifier": "bob", "field": "Exam", "value": "100" }),
    );
    assert_eq!(updated["student"]["grade"], "A");

    let sorted = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "students.sort",
        json!({ "ascending": false }),
    );
    let names: Vec<&str> = sorted["students"]
        .as_array()
        .expect("students array")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    let get = request_ok(
        &mut stdin,
        &mut reader,
        "14",
        "students.get",
        json!({ "name": "bob" }),
    );
    assert!(get["student"].is_null());

    let report = request_ok(&mut stdin, &mut reader, "15", "reports.summary", json!({}));
    let text = report["text"].as_str().expect("report text");
    assert!(text.contains("Number of Students: 2"));

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "students.delete",
        json!({ "identifier": "ALICE" }),
    );
    assert_eq!(deleted["student"]["code"], "1001");
    let missing = request(
        &mut stdin,
        &mut reader,
        "17",
        "students.delete",
        json!({ "identifier": "ALICE" }),
    );
    assert_eq!(error_code(&missing), "not_found");

    let unknown = request(&mut stdin, &mut reader, "18", "students.teleport", json!({}));
    assert_eq!(error_code(&unknown), "not_implemented");

    assert_eq!(
        std::fs::read_to_string(&store).expect("read store"),
        "1\n1002,Bob,5,5,5,100\n"
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn roster_open_reports_skipped_lines_and_load_errors() {
    let dir = temp_dir("rosterd-ipc-open");
    let good = dir.join("good.txt");
    std::fs::write(&good, "3\n1001,Alice,18,19,20,90\nbroken line\n1002,Bob,5,5,5,40\n")
        .expect("write good");
    let bad = dir.join("bad.txt");
    std::fs::write(&bad, "not a count\n").expect("write bad");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&good);

    let list = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(list["students"].as_array().map(|a| a.len()), Some(2));

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "roster.open",
        json!({ "path": good.to_string_lossy() }),
    );
    assert_eq!(opened["loaded"], 2);
    assert_eq!(opened["declaredCount"], 3);
    assert_eq!(opened["skipped"][0]["lineNo"], 3);
    assert!(opened["loadError"].is_null());

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "roster.open",
        json!({ "path": bad.to_string_lossy() }),
    );
    assert_eq!(opened["loaded"], 0);
    assert!(opened["loadError"].as_str().is_some());

    let empty = request_ok(&mut stdin, &mut reader, "4", "stats.highest", json!({}));
    assert!(empty["student"].is_null());
    let avg = request_ok(&mut stdin, &mut reader, "5", "stats.average", json!({}));
    assert_eq!(avg["average"], 0.0);

    let missing_path = request(&mut stdin, &mut reader, "6", "roster.open", json!({}));
    assert_eq!(error_code(&missing_path), "bad_params");

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read bad_json response");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse");
    assert_eq!(error_code(&value), "bad_json");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(dir);
}
