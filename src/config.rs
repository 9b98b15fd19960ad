//! File configuration for service defaults.
//!
//! The file is a small `key = value` subset of TOML: strings double-quoted,
//! integers bare, `#` starts a comment. Values given on the command line
//! override the file, which overrides built-in defaults.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::rate_limit::{DEFAULT_DAILY_MAX, DEFAULT_WINDOW, DEFAULT_WINDOW_MAX, RateLimitPolicy};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default interval between stale rate-limit entry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

const CONFIG_DIR_NAME: &str = "van-tutor";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Values read from the config file; `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Listen address for `serve`.
    pub bind: Option<SocketAddr>,
    /// Topics file, one topic per line.
    pub topics_file: Option<PathBuf>,
    /// Short rate-limit window in milliseconds.
    pub window_ms: Option<u64>,
    /// Requests allowed per short window.
    pub window_max: Option<u32>,
    /// Requests allowed per day.
    pub daily_max: Option<u32>,
    /// Seconds between stale-entry sweeps.
    pub sweep_interval_secs: Option<u64>,
    /// Default log verbosity.
    pub verbosity: Option<VerbositySetting>,
    /// Key clients by `x-user-id`/`x-forwarded-for` set by a fronting proxy.
    pub trust_proxy_headers: Option<bool>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    ///
    /// # Errors
    /// Returns error naming the first out-of-range key.
    pub fn validate(&self) -> Result<()> {
        validate_range("window_ms", self.window_ms, 1, 3_600_000)?;
        validate_range("window_max", self.window_max.map(u64::from), 1, 100_000)?;
        validate_range("daily_max", self.daily_max.map(u64::from), 1, 1_000_000)?;
        validate_range("sweep_interval_secs", self.sweep_interval_secs, 1, 86_400)?;
        Ok(())
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
    }
    Ok(())
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
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Log filter directive for this verbosity.
    #[must_use]
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path, if one could be determined.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists.
    pub config: Option<FileConfig>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/van-tutor/config.toml`
/// 2. `$HOME/.config/van-tutor/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` if given, else from the default path if present.
///
/// # Errors
/// Returns error if an explicit path is missing, or any config file cannot be
/// read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Parses config file contents.
///
/// # Errors
/// Returns error on syntax errors, unknown keys, or invalid values.
pub fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "bind" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                let addr = parsed
                    .parse::<SocketAddr>()
                    .with_context(|| format!("Invalid `bind` address '{parsed}' on line {line_number}"))?;
                cfg.bind = Some(addr);
            }
            "topics_file" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.topics_file = Some(PathBuf::from(parsed));
            }
            "window_ms" => {
                cfg.window_ms = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "window_max" => {
                cfg.window_max = Some(parse_integer_u32(value).with_context(invalid)?);
            }
            "daily_max" => {
                cfg.daily_max = Some(parse_integer_u32(value).with_context(invalid)?);
            }
            "sweep_interval_secs" => {
                cfg.sweep_interval_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "trust_proxy_headers" => {
                cfg.trust_proxy_headers = Some(parse_bool(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_integer_u32(raw_value: &str) -> Result<u32> {
    let value = parse_integer_u64(raw_value)?;
    u32::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u32"))
}

fn parse_bool(raw_value: &str) -> Result<bool> {
    match raw_value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected true or false"),
    }
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        other => bail!("Expected one of default, verbose, quiet, debug; got '{other}'"),
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub bind: Option<SocketAddr>,
    pub topics_file: Option<PathBuf>,
    pub window_ms: Option<u64>,
    pub window_max: Option<u32>,
    pub daily_max: Option<u32>,
    pub trust_proxy_headers: Option<bool>,
}

/// Fully resolved service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub bind: SocketAddr,
    pub topics_file: Option<PathBuf>,
    pub policy: RateLimitPolicy,
    pub sweep_interval: Duration,
    pub trust_proxy_headers: bool,
}

impl ServiceSettings {
    /// Layers defaults, then `file`, then `overrides`.
    ///
    /// # Errors
    /// Returns error if an override is outside the accepted range.
    pub fn resolve(file: Option<&FileConfig>, overrides: &ServeOverrides) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();
        let merged = FileConfig {
            bind: overrides.bind.or(file.bind),
            topics_file: overrides.topics_file.clone().or(file.topics_file),
            window_ms: overrides.window_ms.or(file.window_ms),
            window_max: overrides.window_max.or(file.window_max),
            daily_max: overrides.daily_max.or(file.daily_max),
            sweep_interval_secs: file.sweep_interval_secs,
            verbosity: file.verbosity,
            trust_proxy_headers: overrides.trust_proxy_headers.or(file.trust_proxy_headers),
        };
        merged.validate()?;

        let bind = match merged.bind {
            Some(bind) => bind,
            None => DEFAULT_BIND
                .parse()
                .context("Invalid built-in bind address")?,
        };

        Ok(Self {
            bind,
            topics_file: merged.topics_file,
            policy: RateLimitPolicy {
                window: merged.window_ms.map_or(DEFAULT_WINDOW, Duration::from_millis),
                window_max: merged.window_max.unwrap_or(DEFAULT_WINDOW_MAX),
                daily_max: merged.daily_max.unwrap_or(DEFAULT_DAILY_MAX),
            },
            sweep_interval: merged
                .sweep_interval_secs
                .map_or(DEFAULT_SWEEP_INTERVAL, Duration::from_secs),
            trust_proxy_headers: merged.trust_proxy_headers.unwrap_or(false),
        })
    }
}
