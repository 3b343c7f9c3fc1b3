//! Configuration discovery and effective settings resolution.
//!
//! tde reads `tde.toml|yaml|yml` from the analyzed directory (or the closest
//! ancestor, stopping at a `.git` directory) and merges it with CLI flags to
//! produce an `Effective` config.
//! Defaults:
//! - `group_by`: `error`
//! - `summary`: false
//! - `output`: `toon`
//! - `include|diagnostics|severity`: empty (no filter)
//! - `default_severity`: `warning`
//! - `tool`: `dotnet format` (`[tool]` is only read from a config that sits
//!   in the analyzed directory itself)
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::models::options::{EncodeOptions, FilterOptions, GroupBy};
use crate::models::{Severity, DEFAULT_SEVERITY};
use crate::runner::ToolCommand;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONFIG_FILES: &[&str] = &["tde.toml", "tde.yaml", "tde.yml"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
/// Output rendering.
pub enum OutputMode {
    /// Compact grouped notation
    #[default]
    Toon,
    /// Pretty JSON with the filtered records and a summary
    Json,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// External tool section under `[tool]`.
pub struct ToolCfg {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `tde.toml|yaml`.
pub struct TdeConfig {
    pub group_by: Option<GroupBy>,
    pub summary: Option<bool>,
    pub output: Option<OutputMode>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub diagnostics: Vec<String>,
    #[serde(default)]
    pub severity: Vec<Severity>,
    pub default_severity: Option<Severity>,
    pub tool: Option<ToolCfg>,
}

#[derive(Debug, Clone, Default)]
/// Values given on the command line; `None`/empty means "not given".
pub struct CliOverrides {
    pub group_by: Option<GroupBy>,
    pub summary: bool,
    pub output: Option<OutputMode>,
    pub include: Vec<String>,
    pub diagnostics: Vec<String>,
    pub severity: Vec<Severity>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub filters: FilterOptions,
    pub encoding: EncodeOptions,
    pub output: OutputMode,
    pub default_severity: Severity,
    pub tool: ToolCommand,
}

/// Walk upward from `start` to the directory holding a tde config file.
///
/// Stops at the first directory with a config or a `.git` entry; falls
/// back to `start`.
pub fn detect_config_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `TdeConfig` from `tde.toml` or `tde.yaml|yml` if present. A file
/// that fails to parse is reported and ignored.
pub fn load_config(root: &Path) -> Option<TdeConfig> {
    for name in CONFIG_FILES {
        let p = root.join(name);
        if !p.exists() {
            continue;
        }
        let s = match fs::read_to_string(&p) {
            Ok(s) => s,
            Err(e) => {
                warn!("cannot read {}: {}", p.display(), e);
                return None;
            }
        };
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<TdeConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<TdeConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => {
                debug!("loaded {}", p.display());
                Some(cfg)
            }
            Err(e) => {
                warn!("ignoring invalid {}: {}", p.display(), e);
                None
            }
        };
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(target: &Path, cli: &CliOverrides) -> Effective {
    let start = fs::canonicalize(target).unwrap_or_else(|_| target.to_path_buf());
    let config_root = detect_config_root(&start);
    let cfg = load_config(&config_root).unwrap_or_else(|| {
        debug!("no tde config under {}; using defaults", config_root.display());
        TdeConfig::default()
    });

    let group_by = cli.group_by.or(cfg.group_by).unwrap_or_default();
    let summary = cli.summary || cfg.summary.unwrap_or(false);
    let output = cli.output.or(cfg.output).unwrap_or_default();

    let filters = FilterOptions {
        include_patterns: prefer(&cli.include, cfg.include),
        diagnostic_ids: prefer(&cli.diagnostics, cfg.diagnostics),
        severities: prefer(&cli.severity, cfg.severity),
    };

    // `[tool]` launches a binary, so only a config in the analyzed directory
    // itself may set it; one inherited from an ancestor is ignored.
    let mut tool = ToolCommand::default();
    match cfg.tool {
        Some(t) if config_root == start => {
            if let Some(program) = t.program {
                tool.program = program;
            }
            if let Some(args) = t.args {
                tool.leading_args = args;
            }
        }
        Some(_) => warn!(
            "ignoring [tool] from {}: only a config in the analyzed directory may set it",
            config_root.display()
        ),
        None => {}
    }
    info!(program = %tool.program, args = ?tool.leading_args, "resolved analysis tool");

    Effective {
        filters,
        encoding: EncodeOptions { group_by, summary },
        output,
        default_severity: cfg.default_severity.unwrap_or(DEFAULT_SEVERITY),
        tool,
    }
}

/// A non-empty CLI list replaces the config list wholesale.
fn prefer<T: Clone>(cli: &[T], cfg: Vec<T>) -> Vec<T> {
    if cli.is_empty() {
        cfg
    } else {
        cli.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(dir.path(), &CliOverrides::default());
        assert_eq!(eff.encoding.group_by, GroupBy::Error);
        assert!(!eff.encoding.summary);
        assert_eq!(eff.output, OutputMode::Toon);
        assert!(eff.filters.is_empty());
        assert_eq!(eff.default_severity, Severity::Warning);
        assert_eq!(eff.tool, ToolCommand::default());
    }

    #[test]
    fn test_detect_and_load_toml_from_ancestor() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("tde.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
group_by = "file"
summary = true
output = "json"
include = ["src/**/*.cs"]
severity = ["error", "warn"]
default_severity = "info"

[tool]
program = "/opt/dotnet/dotnet"
args = ["format"]
"#
        )
        .unwrap();
        let nested = root.join("src/App");
        fs::create_dir_all(&nested).unwrap();

        let eff = resolve_effective(&nested, &CliOverrides::default());
        assert_eq!(
            detect_config_root(&fs::canonicalize(&nested).unwrap()),
            fs::canonicalize(root).unwrap()
        );
        assert_eq!(eff.encoding.group_by, GroupBy::File);
        assert!(eff.encoding.summary);
        assert_eq!(eff.output, OutputMode::Json);
        assert_eq!(eff.filters.include_patterns, vec!["src/**/*.cs"]);
        assert_eq!(eff.filters.severities, vec![Severity::Error, Severity::Warning]);
        assert_eq!(eff.default_severity, Severity::Info);
        // [tool] from an ancestor config does not apply to a nested target
        assert_eq!(eff.tool, ToolCommand::default());
    }

    #[test]
    fn test_tool_honoured_only_from_target_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tde.toml"),
            "[tool]\nprogram = \"/opt/dotnet/dotnet\"\nargs = [\"format\", \"--no-build\"]\n",
        )
        .unwrap();
        let eff = resolve_effective(dir.path(), &CliOverrides::default());
        assert_eq!(eff.tool.program, "/opt/dotnet/dotnet");
        assert_eq!(eff.tool.leading_args, vec!["format", "--no-build"]);

        let nested = dir.path().join("src");
        fs::create_dir(&nested).unwrap();
        let eff = resolve_effective(&nested, &CliOverrides::default());
        assert_eq!(eff.tool, ToolCommand::default());
    }

    #[test]
    fn test_severity_values_are_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tde.toml"),
            "group_by = \"file\"\nseverity = [\"Error\", \"WARN\", \"Information\"]\ndefault_severity = \"Hidden\"\n",
        )
        .unwrap();
        let eff = resolve_effective(dir.path(), &CliOverrides::default());
        assert_eq!(eff.encoding.group_by, GroupBy::File);
        assert_eq!(
            eff.filters.severities,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );
        assert_eq!(eff.default_severity, Severity::Hidden);

        fs::remove_file(dir.path().join("tde.toml")).unwrap();
        fs::write(
            dir.path().join("tde.yaml"),
            "severity:\n  - Warning\n  - hidden\n",
        )
        .unwrap();
        let eff = resolve_effective(dir.path(), &CliOverrides::default());
        assert_eq!(eff.filters.severities, vec![Severity::Warning, Severity::Hidden]);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tde.yaml"),
            "group_by: file\ndiagnostics:\n  - IDE0055\n",
        )
        .unwrap();
        let eff = resolve_effective(dir.path(), &CliOverrides::default());
        assert_eq!(eff.encoding.group_by, GroupBy::File);
        assert_eq!(eff.filters.diagnostic_ids, vec!["IDE0055"]);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tde.toml"),
            "group_by = \"file\"\ndiagnostics = [\"CA1031\"]\ninclude = [\"a/*.cs\"]\n",
        )
        .unwrap();
        let cli = CliOverrides {
            group_by: Some(GroupBy::Error),
            diagnostics: vec!["IDE0055".into()],
            ..CliOverrides::default()
        };
        let eff = resolve_effective(dir.path(), &cli);
        assert_eq!(eff.encoding.group_by, GroupBy::Error);
        assert_eq!(eff.filters.diagnostic_ids, vec!["IDE0055"]);
        // untouched by the CLI, so the config value stays
        assert_eq!(eff.filters.include_patterns, vec!["a/*.cs"]);
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tde.toml"), "group_by = [[[").unwrap();
        assert!(load_config(dir.path()).is_none());
        let eff = resolve_effective(dir.path(), &CliOverrides::default());
        assert_eq!(eff.encoding.group_by, GroupBy::Error);
    }
}
