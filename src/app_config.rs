//! Application configuration loading for CLI defaults.

use std::env;
use std::fmt::Display;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Config-file defaults for the renamer. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Leading pages scanned for a DOI.
    pub pages: Option<u8>,
    /// Maximum simultaneous registry requests.
    pub per_host_connections: Option<u8>,
    /// Registry connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Total registry request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Contact address for Crossref's polite pool.
    pub mailto: Option<String>,
    /// Match the PDF extension case-insensitively.
    pub ignore_extension_case: Option<bool>,
    /// Plan renames without performing them.
    pub dry_run: Option<bool>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_range("concurrency", self.concurrency, 1..=100)?;
        validate_range("pages", self.pages, 1..=20)?;
        validate_range("per_host_connections", self.per_host_connections, 1..=100)?;
        validate_range("connect_timeout_secs", self.connect_timeout_secs, 1..=3600)?;
        validate_range("request_timeout_secs", self.request_timeout_secs, 1..=3600)?;
        if let Some(mailto) = &self.mailto
            && mailto.chars().any(char::is_control)
        {
            bail!("Invalid config value for `mailto`: contains control characters");
        }
        Ok(())
    }
}

fn validate_range<T>(field: &str, value: Option<T>, range: RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + Display,
{
    match value {
        Some(value) if !range.contains(&value) => bail!(
            "Invalid config value for `{field}`: {value}. Expected range: {}..={}",
            range.start(),
            range.end()
        ),
        _ => Ok(()),
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the tracing filter level for this setting.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/paper-renamer/config.toml`
/// 2. `$HOME/.config/paper-renamer/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("paper-renamer")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("paper-renamer")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. Without one, the default location is used
/// when present and silently skipped when absent.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (index, raw_line) in raw.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let (key, value) = (key.trim(), value.trim());
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "concurrency" => cfg.concurrency = Some(number(value).with_context(invalid)?),
            "pages" => cfg.pages = Some(number(value).with_context(invalid)?),
            "per_host_connections" => {
                cfg.per_host_connections = Some(number(value).with_context(invalid)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(number(value).with_context(invalid)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(number(value).with_context(invalid)?);
            }
            "mailto" => cfg.mailto = Some(quoted(value).with_context(invalid)?.to_string()),
            "ignore_extension_case" => {
                cfg.ignore_extension_case = Some(flag(value).with_context(invalid)?);
            }
            "dry_run" => cfg.dry_run = Some(flag(value).with_context(invalid)?),
            "verbosity" => {
                cfg.verbosity = Some(quoted(value).and_then(parse_verbosity).with_context(invalid)?);
            }
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Cuts a `#` comment, ignoring `#` inside a quoted value.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    line.char_indices()
        .find(|&(_, ch)| {
            if ch == '"' {
                in_quotes = !in_quotes;
            }
            ch == '#' && !in_quotes
        })
        .map_or(line, |(index, _)| &line[..index])
}

fn quoted(value: &str) -> Result<&str> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .context("Expected double-quoted string")
}

fn number<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value
        .parse()
        .with_context(|| format!("Expected a non-negative integer, got '{value}'"))
}

fn flag(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("Expected true or false, got '{other}'"),
    }
}

fn parse_verbosity(label: &str) -> Result<VerbositySetting> {
    match label {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        other => bail!("Unknown verbosity '{other}'; expected default, verbose, quiet or debug"),
    }
}
