//! End-to-end runs with a shell script standing in for `dotnet format`.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use tde::models::options::{AnalysisKind, EncodeOptions, FilterOptions, GroupBy};
use tde::models::Severity;
use tde::runner::ToolCommand;
use tde::{extract, Outcome, Request, TdeError};
use tempfile::tempdir;

/// Records the report path and argv in the working directory, then runs
/// `body` with `$out` pointing at the report and `$dir` at the cwd.
const PRELUDE: &str = r#"
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "--report" ]; then out="$a"; fi
  prev="$a"
done
dir=$(pwd -P)
printf '%s\n' "$out" > report-path.txt
printf '%s\n' "$@" > args.txt
"#;

const REPORT_BODY: &str = r#"
cat > "$out" <<JSON
[
  {"FileName": "A.cs", "FilePath": "$dir/src/A.cs", "FileChanges": [
    {"LineNumber": 10, "CharNumber": 45, "DiagnosticId": "IDE0055", "FormatDescription": "warning IDE0055: Fix formatting"},
    {"LineNumber": 3, "CharNumber": 1, "FormatDescription": "warning: no id here"}
  ]},
  {"FileName": "B.cs", "FilePath": "$dir/src/B.cs", "FileChanges": [
    {"LineNumber": 7, "CharNumber": 13, "DiagnosticId": "IDE0055", "FormatDescription": "warning IDE0055: Fix formatting"},
    {"LineNumber": 1, "CharNumber": 1, "DiagnosticId": "IDE1006", "FormatDescription": "error IDE1006: Naming rule violation"}
  ]}
]
JSON
exit 2
"#;

fn fake_tool(body: &str) -> ToolCommand {
    ToolCommand {
        program: "sh".into(),
        leading_args: vec![
            "-c".into(),
            format!("{}{}", PRELUDE, body),
            "fake-dotnet".into(),
        ],
    }
}

fn request<'a>(target: &'a Path, body: &str) -> Request<'a> {
    let mut req = Request::new(target, AnalysisKind::Style);
    req.tool = fake_tool(body);
    req
}

fn recorded_report_path(target: &Path) -> String {
    fs::read_to_string(target.join("report-path.txt"))
        .unwrap()
        .trim()
        .to_string()
}

#[test]
fn test_violations_are_grouped_by_rule() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path(), REPORT_BODY);
    req.filters = FilterOptions {
        diagnostic_ids: vec!["IDE0055".into()],
        ..FilterOptions::default()
    };
    let ex = extract(&req).unwrap();

    assert_eq!(ex.outcome, Outcome::DiagnosticsPresent);
    assert_eq!(ex.diagnostics.len(), 2);
    let expected = [
        "IDE0055:",
        "{key,message,count}: IDE0055,Fix formatting,2",
        "[2,]{location,severity}:",
        " \"src/A.cs:10,45\",warning",
        " \"src/B.cs:7,13\",warning",
    ]
    .join("\n");
    assert_eq!(ex.text, expected);

    let report = recorded_report_path(dir.path());
    assert!(!report.is_empty());
    assert!(!Path::new(&report).exists(), "temp report should be removed");
}

#[test]
fn test_fixed_flag_policy_reaches_the_tool() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path(), REPORT_BODY);
    req.filters.severities = vec![Severity::Error];
    extract(&req).unwrap();
    let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "style");
    for flag in ["--verify-no-changes", "--no-restore", "--report", "--include"] {
        assert!(args.contains(&flag), "missing {}", flag);
    }
    let sev = args.iter().position(|a| *a == "--severity").unwrap();
    assert_eq!(args[sev + 1], "error");
}

#[test]
fn test_summary_by_file() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path(), REPORT_BODY);
    req.encoding = EncodeOptions {
        group_by: GroupBy::File,
        summary: true,
    };
    let ex = extract(&req).unwrap();
    assert_eq!(ex.text, "[2,]{key,count}:\n src/A.cs,1\n src/B.cs,2");
}

#[test]
fn test_clean_run_encodes_empty_block() {
    let dir = tempdir().unwrap();
    let ex = extract(&request(dir.path(), "exit 0\n")).unwrap();
    assert_eq!(ex.outcome, Outcome::Clean);
    assert!(ex.diagnostics.is_empty());
    assert_eq!(ex.text, "[0,]{location,severity}:");
}

#[test]
fn test_violations_exit_with_empty_report_is_clean() {
    let dir = tempdir().unwrap();
    let ex = extract(&request(dir.path(), "printf '[]' > \"$out\"\nexit 2\n")).unwrap();
    assert_eq!(ex.outcome, Outcome::Clean);
    assert_eq!(ex.text, "[0,]{location,severity}:");
}

#[test]
fn test_unexpected_exit_carries_stderr_and_cleans_up() {
    let dir = tempdir().unwrap();
    let err = extract(&request(
        dir.path(),
        "echo 'MSB1003: Specify a project or solution file.' >&2\nexit 1\n",
    ))
    .unwrap_err();
    match &err {
        TdeError::ExternalTool { code, stderr, .. } => {
            assert_eq!(*code, Some(1));
            assert!(stderr.contains("MSB1003"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 4);
    assert!(!Path::new(&recorded_report_path(dir.path())).exists());
}

#[test]
fn test_malformed_report_is_an_error() {
    let dir = tempdir().unwrap();
    let err = extract(&request(
        dir.path(),
        "printf 'not json' > \"$out\"\nexit 2\n",
    ))
    .unwrap_err();
    assert!(matches!(err, TdeError::MalformedReport(_)));
    assert!(!Path::new(&recorded_report_path(dir.path())).exists());
}

#[test]
fn test_missing_target_is_invalid() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = extract(&request(&missing, REPORT_BODY)).unwrap_err();
    assert!(matches!(err, TdeError::InvalidTarget(_)));
    assert_eq!(err.exit_code(), 3);
}
