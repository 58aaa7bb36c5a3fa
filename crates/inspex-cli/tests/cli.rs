use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use calamine::{open_workbook, Data, Reader, Xlsx};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const STORE_PAGE: &str =
    "Jane Doe\nStore ID and Name\n001 - Main St\nTracker\nINS-2024\nInspector\nJohn Smith";

const AUDIT_PAGE: &str = "Document No.\nDOC-55\nSite Name\nNorth Depot";

const OTHER_PAGE: &str = "Weekly newsletter\nNothing to see here";

/// Command isolated from the user's configuration directory.
fn inspex(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inspex").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

/// Config accepting plain-text page dumps in batches.
fn text_batch_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, r#"{ "batch": { "extensions": ["txt"], "jobs": 2 } }"#).unwrap();
    path
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.add_directory("nested/", options).unwrap();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn process_prints_record_as_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("store.txt");
    fs::write(&input, STORE_PAGE).unwrap();

    let output = inspex(dir.path())
        .arg("process")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["Inspection"], "Jane Doe");
    assert_eq!(json["Store ID and Name"], "001 - Main St");
    assert_eq!(json["Tracker"], "INS-2024");
    assert_eq!(json["Inspector"], "John Smith");
    assert!(json["Handover Date"].is_null());
    assert_eq!(json["Document Type"], "type_1");
    assert_eq!(json["Source File"], "store.txt");
}

#[test]
fn process_writes_csv_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("audit.txt");
    let output = dir.path().join("audit.csv");
    fs::write(&input, AUDIT_PAGE).unwrap();

    inspex(dir.path())
        .args(["process", "--format", "csv", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Document No.,Audit Title,Site Name,"));
    assert!(lines[0].ends_with(",Document Type,Source File"));
    assert_eq!(lines[1], "DOC-55,,North Depot,,,,,,,,,type_2,audit.txt");
}

#[test]
fn process_reports_unrecognized_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("other.txt");
    fs::write(&input, OTHER_PAGE).unwrap();

    inspex(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("not a recognized report"));
}

#[test]
fn process_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scan.png");
    fs::write(&input, b"not an image").unwrap();

    inspex(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn batch_zip_writes_one_table_per_type() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("reports.zip");
    let out = dir.path().join("out");
    write_zip(
        &archive,
        &[
            ("b-audit.txt", AUDIT_PAGE),
            ("a-store.txt", STORE_PAGE),
            ("c-other.txt", OTHER_PAGE),
            ("notes.md", AUDIT_PAGE),
        ],
    );

    inspex(dir.path())
        .arg("--config")
        .arg(text_batch_config(dir.path()))
        .args(["batch", "--format", "csv"])
        .arg(&archive)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 documents"))
        .stdout(predicate::str::contains("c-other.txt: unrecognized document type"));

    let store = fs::read_to_string(out.join("inspection_summary_type_1.csv")).unwrap();
    let store_lines: Vec<&str> = store.lines().collect();
    assert_eq!(store_lines.len(), 2);
    assert!(store_lines[0].starts_with("Inspection,Store ID and Name,Tracker,Inspector,"));
    assert!(store_lines[1].starts_with("Jane Doe,001 - Main St,INS-2024,John Smith,"));
    assert!(store_lines[1].ends_with(",type_1,a-store.txt"));

    let audit = fs::read_to_string(out.join("inspection_summary_type_2.csv")).unwrap();
    let audit_lines: Vec<&str> = audit.lines().collect();
    assert_eq!(audit_lines.len(), 2);
    assert_eq!(audit_lines[1], "DOC-55,,North Depot,,,,,,,,,type_2,b-audit.txt");
}

#[test]
fn batch_writes_spreadsheets_by_default() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("reports.zip");
    let out = dir.path().join("out");
    write_zip(&archive, &[("a-store.txt", STORE_PAGE), ("b-audit.txt", AUDIT_PAGE)]);

    inspex(dir.path())
        .arg("--config")
        .arg(text_batch_config(dir.path()))
        .arg("batch")
        .arg(&archive)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    let mut workbook: Xlsx<_> = open_workbook(out.join("inspection_summary_type_2.xlsx")).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["type_2".to_string()]);

    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(range.get_size(), (2, 13));
    assert_eq!(range.get((0, 0)), Some(&Data::String("Document No.".to_string())));
    assert_eq!(range.get((0, 12)), Some(&Data::String("Source File".to_string())));
    assert_eq!(range.get((1, 0)), Some(&Data::String("DOC-55".to_string())));
    assert_eq!(range.get((1, 1)), Some(&Data::Empty));
    assert_eq!(range.get((1, 2)), Some(&Data::String("North Depot".to_string())));
    assert_eq!(range.get((1, 11)), Some(&Data::String("type_2".to_string())));
    assert_eq!(range.get((1, 12)), Some(&Data::String("b-audit.txt".to_string())));

    assert!(out.join("inspection_summary_type_1.xlsx").exists());
}

#[test]
fn batch_fail_fast_aborts_on_unreadable_document() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("reports.zip");
    let out = dir.path().join("out");
    write_zip(&archive, &[("broken.pdf", "not a pdf"), ("b-audit.txt", AUDIT_PAGE)]);

    let config = dir.path().join("config.json");
    fs::write(&config, r#"{ "batch": { "extensions": ["pdf", "txt"], "jobs": 1 } }"#).unwrap();

    inspex(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["batch", "--fail-fast", "--output-dir"])
        .arg(&out)
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse PDF"));

    assert!(!out.exists());
}

#[test]
fn batch_glob_keeps_input_order_and_skips_empty_buckets() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    let out = dir.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("1.txt"), "Document No.\nDOC-1").unwrap();
    fs::write(input.join("2.txt"), "Document No.\nDOC-2").unwrap();
    fs::write(input.join("3.txt"), "Document No.\nDOC-3").unwrap();

    let pattern = format!("{}/*.txt", input.display());
    inspex(dir.path())
        .arg("--config")
        .arg(text_batch_config(dir.path()))
        .args(["batch", "--format", "json", "--output-dir"])
        .arg(&out)
        .arg(&pattern)
        .assert()
        .success();

    assert!(!out.join("inspection_summary_type_1.json").exists());

    let audit = fs::read_to_string(out.join("inspection_summary_type_2.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&audit).unwrap();
    let numbers: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["Document No."].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["DOC-1", "DOC-2", "DOC-3"]);
    assert_eq!(json[0]["Source File"], "1.txt");
}

#[test]
fn batch_without_records_reports_no_data() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("reports.zip");
    let out = dir.path().join("out");
    write_zip(&archive, &[("other.txt", OTHER_PAGE)]);

    inspex(dir.path())
        .arg("--config")
        .arg(text_batch_config(dir.path()))
        .arg("batch")
        .arg(&archive)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("No data extracted"));

    assert!(!out.exists());
}

#[test]
fn batch_fails_without_matching_documents() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.pdf", dir.path().display());

    inspex(dir.path())
        .arg("batch")
        .arg(&pattern)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching documents"));
}

#[test]
fn rules_lists_audit_table() {
    let dir = TempDir::new().unwrap();

    inspex(dir.path())
        .args(["rules", "--type", "type_2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("audit report (type_2, 11 fields)"))
        .stdout(predicate::str::contains("Contractor Name"))
        .stdout(predicate::str::contains("compound"))
        .stdout(predicate::str::contains("Store ID and Name").not());
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();

    inspex(dir.path())
        .args(["config", "set", "batch.jobs", "8"])
        .assert()
        .success();

    inspex(dir.path())
        .args(["config", "get", "batch.jobs"])
        .assert()
        .success()
        .stdout(predicate::str::diff("8\n"));

    inspex(dir.path())
        .args(["config", "set", "batch.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn config_commands_honour_config_flag() {
    let dir = TempDir::new().unwrap();
    let config = text_batch_config(dir.path());

    inspex(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "batch.extensions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"txt\""));

    inspex(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No config file found").not())
        .stdout(predicate::str::contains("\"jobs\": 2"));
}
