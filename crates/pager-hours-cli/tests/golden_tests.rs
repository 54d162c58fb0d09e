use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use similar::{ChangeTag, TextDiff};

/// (fixture stem, policy, --from, --to)
const REPORT_CASES: &[(&str, &str, &str, &str)] = &[
    ("berlin_week", "PPLATFORM", "2024-03-04", "2024-03-11"),
    ("orthodox_easter", "PSOFIA", "2024-05-01", "2024-05-09"),
    ("us_thanksgiving", "PUS", "2024-11-28", "2024-12-02"),
];

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    project_root().join("fixtures")
}

fn golden_dir() -> PathBuf {
    project_root().join("golden")
}

fn update_golden() -> bool {
    std::env::var("UPDATE_GOLDEN").is_ok()
}

fn diff_strings(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(&format!("{sign}{change}"));
    }
    out
}

/// Run the binary without any credentials from the environment.
fn pager_hours(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pager-hours"))
        .args(args)
        .env_remove("PAGERDUTY_TOKEN")
        .env_remove("GDRIVE_CLIENT_ID")
        .env_remove("GDRIVE_CLIENT_SECRET")
        .env_remove("GDRIVE_REFRESH_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute pager-hours")
}

fn check_golden(name: &str, actual: &str) {
    let golden = golden_dir();
    let golden_path = golden.join(name);

    if update_golden() {
        fs::create_dir_all(&golden).ok();
        fs::write(&golden_path, actual)
            .unwrap_or_else(|e| panic!("Failed to write golden file {golden_path:?}: {e}"));
        eprintln!("Updated golden file: {golden_path:?}");
        return;
    }

    let expected = fs::read_to_string(&golden_path).unwrap_or_else(|e| {
        panic!(
            "Golden file {golden_path:?} not found: {e}\n\
             Hint: Run with UPDATE_GOLDEN=1 to generate golden files"
        )
    });

    if actual != expected {
        let diff = diff_strings(&expected, actual);
        panic!(
            "Golden test mismatch for {name}:\n\n\
             {diff}\n\n\
             Run with UPDATE_GOLDEN=1 to refresh snapshots"
        );
    }
}

#[test]
fn golden_csv_reports() {
    let fixtures = fixture_dir();

    for (stem, policy, from, to) in REPORT_CASES {
        let fixture_path = fixtures.join(format!("{stem}.json"));
        let fixture = fixture_path.to_str().unwrap();

        let output = pager_hours(&[
            "report",
            "--snapshot",
            fixture,
            "--policy",
            policy,
            "--from",
            from,
            "--to",
            to,
        ]);

        assert!(
            output.status.success(),
            "pager-hours failed for {}: {}",
            stem,
            String::from_utf8_lossy(&output.stderr)
        );

        let actual = String::from_utf8(output.stdout).expect("Output is not valid UTF-8");
        check_golden(&format!("{stem}.csv"), &actual);
    }
}

#[test]
fn every_fixture_has_a_case() {
    let mut stems: Vec<String> = fs::read_dir(fixture_dir())
        .expect("Failed to read fixtures directory")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    stems.sort();

    let mut cases: Vec<String> = REPORT_CASES.iter().map(|c| c.0.to_string()).collect();
    cases.sort();
    assert_eq!(stems, cases);
}

#[test]
fn report_to_file_matches_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("report.csv");
    let fixture = fixture_dir().join("berlin_week.json");

    let output = pager_hours(&[
        "report",
        "--snapshot",
        fixture.to_str().unwrap(),
        "--policy",
        "PPLATFORM",
        "--from",
        "2024-03-04",
        "--to",
        "2024-03-11",
        "--output",
        out_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(&out_path).unwrap();
    let expected = fs::read_to_string(golden_dir().join("berlin_week.csv")).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn holidays_listing_text() {
    let output = pager_hours(&["holidays", "--region", "berlin", "--year", "2024"]);
    assert!(output.status.success());

    let actual = String::from_utf8(output.stdout).unwrap();
    check_golden("holidays_berlin_2024.txt", &actual);
}

#[test]
fn holidays_listing_json() {
    let output = pager_hours(&[
        "holidays",
        "--region",
        "bulgaria",
        "--year",
        "2016",
        "--output-format",
        "json",
    ]);
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let easter = parsed
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["date"] == "2016-05-01")
        .unwrap();
    assert_eq!(easter["name"], "Easter");
}

#[test]
fn policies_listing_text() {
    let fixture = fixture_dir().join("us_thanksgiving.json");
    let output = pager_hours(&["policies", "--snapshot", fixture.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "- PUS US Support\n");
}

#[test]
fn missing_token_exits_with_input_error() {
    let output = pager_hours(&["policies"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error: A PagerDuty token is required"));
}

#[test]
fn calendar_gap_exits_with_input_error_envelope() {
    let output = pager_hours(&[
        "holidays",
        "--region",
        "bulgaria",
        "--year",
        "2050",
        "--output-format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(2));

    let envelope: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["exit_code"], 2);
    assert_eq!(envelope["error"], "Don't know orthodox easter for year 2050");
}

#[test]
fn unknown_policy_exits_with_runtime_error() {
    let fixture = fixture_dir().join("berlin_week.json");
    let output = pager_hours(&[
        "report",
        "--snapshot",
        fixture.to_str().unwrap(),
        "--policy",
        "PNOPE",
        "--from",
        "2024-03-04",
        "--to",
        "2024-03-11",
    ]);
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
}

#[test]
fn inverted_range_exits_with_input_error() {
    let fixture = fixture_dir().join("berlin_week.json");
    let output = pager_hours(&[
        "report",
        "--snapshot",
        fixture.to_str().unwrap(),
        "--policy",
        "PPLATFORM",
        "--from",
        "2024-03-11",
        "--to",
        "2024-03-04",
    ]);
    assert_eq!(output.status.code(), Some(2));
}
