use assert_cmd::Command;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("stalgebra 0.1.0\n");
}

// Validate subcommand tests

#[test]
fn validate_valid_detections_succeeds_with_warning() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args(["validate", "tests/fixtures/detections_valid.json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("0 error(s) and 1 warning(s)"))
        .stdout(predicates::str::contains("EmptyKey"));
}

#[test]
fn validate_strict_fails_on_warnings() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args(["validate", "tests/fixtures/detections_valid.json", "--strict"]);
    cmd.assert().failure();
}

#[test]
fn validate_invalid_detections_fails() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args(["validate", "tests/fixtures/detections_invalid.json"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("error(s)"))
        .stdout(predicates::str::contains("InvalidBoundsOrdering"))
        .stdout(predicates::str::contains("OutOfFrame"))
        .stdout(predicates::str::contains("ScoreOutOfRange"))
        .stdout(predicates::str::contains("EmptyLabel"));
}

#[test]
fn validate_json_output_format() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "validate",
        "tests/fixtures/detections_valid.json",
        "--output",
        "json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"error_count\": 0"))
        .stdout(predicates::str::contains("\"warning_count\": 1"));
}

#[test]
fn validate_csv_input_passes() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "validate",
        "tests/fixtures/detections.csv",
        "--format",
        "csv",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn validate_unsupported_format_fails() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "validate",
        "tests/fixtures/detections_valid.json",
        "--format",
        "parquet",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unsupported format"));
}

#[test]
fn validate_nonexistent_file_fails() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args(["validate", "nonexistent_file.json"]);
    cmd.assert().failure();
}

// Inspect subcommand tests

#[test]
fn inspect_prints_report() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args(["inspect", "tests/fixtures/detections_valid.json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Detection Inspection Report"))
        .stdout(predicates::str::contains("person"));
}

#[test]
fn inspect_json_output_format() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "inspect",
        "tests/fixtures/detections_valid.json",
        "--output",
        "json",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["summary"]["keys"], 3);
    assert_eq!(report["summary"]["detections"], 6);
}

// Query subcommand tests

#[test]
fn query_filters_by_label_into_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("people.json");

    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args(["query", "tests/fixtures/detections_valid.json", "--label", "person"])
        .arg("--output")
        .arg(&out);
    cmd.assert().success();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["video_1"].as_array().unwrap().len(), 2);
    assert_eq!(written["video_2"].as_array().unwrap().len(), 1);
    assert!(written["video_3"].as_array().unwrap().is_empty());
}

#[test]
fn query_coalesces_tracks() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "query",
        "tests/fixtures/detections_valid.json",
        "--label",
        "person",
        "--coalesce-gap",
        "0.5",
        "--threads",
        "1",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["video_1"].as_array().unwrap().len(), 1);
}

#[test]
fn query_pairs_nearby_labels() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "query",
        "tests/fixtures/detections_valid.json",
        "--label",
        "person",
        "--with-label",
        "car",
        "--window",
        "0.5",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let pairs: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(pairs["video_1"].as_array().unwrap().len(), 2);
    assert_eq!(pairs["video_2"].as_array().unwrap().len(), 1);
}

#[test]
fn query_with_label_requires_window() {
    let mut cmd = Command::cargo_bin("stalgebra").unwrap();
    cmd.args([
        "query",
        "tests/fixtures/detections_valid.json",
        "--with-label",
        "car",
    ]);
    cmd.assert().failure();
}
