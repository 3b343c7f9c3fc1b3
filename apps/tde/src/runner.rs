//! Run `dotnet format` against a target directory and collect its JSON
//! report.
//!
//! The report goes to a scoped temp file that is removed when the guard
//! drops, on every exit path. The tool's own stdout is never parsed.

use crate::error::{Result, TdeError};
use crate::models::options::{AnalysisKind, FilterOptions};
use crate::models::Severity;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempPath;
use tracing::{debug, warn};

/// Exit code `dotnet format --verify-no-changes` uses when it found
/// something to report.
pub const VIOLATIONS_EXIT_CODE: i32 = 2;

/// Include pattern handed to the tool when the caller gives none.
pub const DEFAULT_INCLUDE: &str = "**/*.cs";

#[derive(Debug, Clone, PartialEq, Eq)]
/// How to launch the external tool: `program leading_args.. <kind> <flags..>`.
pub struct ToolCommand {
    pub program: String,
    pub leading_args: Vec<String>,
}

impl Default for ToolCommand {
    fn default() -> Self {
        ToolCommand {
            program: "dotnet".to_string(),
            leading_args: vec!["format".to_string()],
        }
    }
}

#[derive(Debug)]
/// Raw result of one tool run that did not fail.
pub struct RunOutput {
    pub exit_code: i32,
    pub report: Vec<u8>,
}

impl RunOutput {
    pub fn violations_found(&self) -> bool {
        self.exit_code == VIOLATIONS_EXIT_CODE
    }
}

/// Check that `target` is an existing directory and return its canonical
/// form.
pub fn validate_target(target: &Path) -> Result<PathBuf> {
    match fs::metadata(target) {
        Ok(md) if md.is_dir() => Ok(fs::canonicalize(target)?),
        _ => Err(TdeError::InvalidTarget(target.to_path_buf())),
    }
}

/// Run the tool once and return the report bytes.
///
/// Exit code 0 and [`VIOLATIONS_EXIT_CODE`] are both success; any other
/// status is an [`TdeError::ExternalTool`] carrying the tool's stderr. No
/// retries.
pub fn run(
    target: &Path,
    kind: AnalysisKind,
    opts: &FilterOptions,
    tool: &ToolCommand,
) -> Result<RunOutput> {
    let workdir = validate_target(target)?;
    let report_path = scoped_report_path()?;

    let mut args: Vec<OsString> = tool.leading_args.iter().map(OsString::from).collect();
    args.extend(build_args(kind, &report_path, opts));
    debug!(program = %tool.program, ?args, "running analysis");

    let output = Command::new(&tool.program)
        .args(&args)
        .current_dir(&workdir)
        .output()
        .map_err(|source| TdeError::ToolLaunch {
            program: tool.program.clone(),
            source,
        })?;
    let code = output.status.code();
    debug!(?code, report = %report_path.display(), "analysis finished");

    match code {
        Some(c) if c == 0 || c == VIOLATIONS_EXIT_CODE => {
            let report = read_report(&report_path)?;
            debug!(bytes = report.len(), "loaded report");
            Ok(RunOutput {
                exit_code: c,
                report,
            })
        }
        _ => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(?code, %stderr, "{} failed", tool.program);
            Err(TdeError::ExternalTool {
                program: tool.program.clone(),
                code,
                stderr,
            })
        }
    }
    // report_path drops here and removes the file
}

/// Allocate the temp report location. The file is created empty and closed
/// so the tool can overwrite it; dropping the guard deletes it.
fn scoped_report_path() -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix("tde-report-")
        .suffix(".json")
        .tempfile()?;
    Ok(file.into_temp_path())
}

/// A missing or empty report means the tool had nothing to say.
fn read_report(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(b"[]".to_vec()),
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(b"[]".to_vec()),
        Err(e) => Err(e.into()),
    }
}

/// Flags passed after the sub-command. The policy is fixed: no restore,
/// verify mode, quiet output, JSON report at `report`.
pub fn build_args(kind: AnalysisKind, report: &Path, opts: &FilterOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        kind.as_str().into(),
        "--verify-no-changes".into(),
        "--verbosity".into(),
        "quiet".into(),
        "--no-restore".into(),
        "--report".into(),
        report.as_os_str().to_os_string(),
    ];

    args.push("--include".into());
    if opts.include_patterns.is_empty() {
        args.push(DEFAULT_INCLUDE.into());
    } else {
        args.extend(opts.include_patterns.iter().map(OsString::from));
    }

    if !opts.diagnostic_ids.is_empty() {
        args.push("--diagnostics".into());
        args.extend(opts.diagnostic_ids.iter().map(OsString::from));
    }

    // The tool's --severity is a floor, so hand it the lowest requested
    // level and let the filter narrow to the exact set.
    if let Some(min) = opts.severities.iter().copied().min_by_key(|s| s.rank()) {
        args.push("--severity".into());
        args.push(tool_severity(min).into());
    }
    args
}

fn tool_severity(s: Severity) -> &'static str {
    match s {
        Severity::Error => "error",
        Severity::Warning => "warn",
        Severity::Info => "info",
        Severity::Hidden => "hidden",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn strs(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_build_args_fixed_policy_and_default_include() {
        let args = strs(&build_args(
            AnalysisKind::Style,
            Path::new("/tmp/r.json"),
            &FilterOptions::default(),
        ));
        assert_eq!(
            args,
            vec![
                "style",
                "--verify-no-changes",
                "--verbosity",
                "quiet",
                "--no-restore",
                "--report",
                "/tmp/r.json",
                "--include",
                "**/*.cs",
            ]
        );
    }

    #[test]
    fn test_build_args_pass_through_options() {
        let opts = FilterOptions {
            include_patterns: vec!["src/**/*.cs".into()],
            diagnostic_ids: vec!["CA1031".into(), "CA2007".into()],
            severities: vec![Severity::Error, Severity::Warning],
        };
        let args = strs(&build_args(AnalysisKind::Analyzers, Path::new("r.json"), &opts));
        assert_eq!(args[0], "analyzers");
        let tail = &args[7..];
        assert_eq!(
            tail,
            &[
                "--include",
                "src/**/*.cs",
                "--diagnostics",
                "CA1031",
                "CA2007",
                "--severity",
                "warn",
            ]
        );
    }

    #[test]
    fn test_violations_found_tracks_exit_code() {
        let out = |exit_code| RunOutput {
            exit_code,
            report: b"[]".to_vec(),
        };
        assert!(out(VIOLATIONS_EXIT_CODE).violations_found());
        assert!(!out(0).violations_found());
    }

    #[test]
    fn test_validate_target_rejects_missing_and_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("x.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            validate_target(&dir.path().join("missing")),
            Err(TdeError::InvalidTarget(_))
        ));
        assert!(matches!(
            validate_target(&file),
            Err(TdeError::InvalidTarget(_))
        ));
        assert!(validate_target(dir.path()).is_ok());
    }

    #[test]
    fn test_read_report_treats_missing_or_blank_as_empty_list() {
        let dir = tempdir().unwrap();
        assert_eq!(read_report(&dir.path().join("none.json")).unwrap(), b"[]");
        let blank = dir.path().join("blank.json");
        fs::write(&blank, "\n").unwrap();
        assert_eq!(read_report(&blank).unwrap(), b"[]");
    }

    #[test]
    fn test_scoped_report_path_is_removed_on_drop() {
        let guard = scoped_report_path().unwrap();
        let path = guard.to_path_buf();
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let dir = tempdir().unwrap();
        let tool = ToolCommand {
            program: "tde-definitely-not-installed".into(),
            leading_args: vec![],
        };
        let err = run(
            dir.path(),
            AnalysisKind::Style,
            &FilterOptions::default(),
            &tool,
        )
        .unwrap_err();
        assert!(matches!(err, TdeError::ToolLaunch { .. }));
    }

    #[test]
    fn test_invalid_target_fails_before_spawning() {
        let err = run(
            Path::new("/definitely/not/here"),
            AnalysisKind::Style,
            &FilterOptions::default(),
            &ToolCommand::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TdeError::InvalidTarget(_)));
    }
}
