//! Configuration system for blogdesk.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (BLOGDESK_*)
//! 3. Project manifests (.blogdesk/config.yaml, nearest directory wins)
//! 4. User global (~/.config/blogdesk/config.yaml)
//! 5. Built-in defaults (lowest priority)
//!
//! This module provides:
//! - `Config` struct with all settings
//! - `EnvVar` registry for documentation
//! - Helper functions for env var parsing
//! - Config loading and merging

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::schedule::DEFAULT_NOTICE_SECS;
use crate::toc::DEFAULT_SCROLL_OFFSET;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration for blogdesk.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Backend connection
    pub api: ApiConfig,
    /// Table of contents rendering
    pub toc: TocConfig,
    /// Schedule import settings
    pub schedule: ScheduleConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// Behavior settings
    pub behavior: BehaviorConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST backend, including the `/api` prefix
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TocConfig {
    /// Pixels kept above a heading when jumping to it
    pub scroll_offset: u32,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            scroll_offset: DEFAULT_SCROLL_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds an import success notice stays visible
    pub notice_secs: u64,
    /// Extra or replacement default notes, keyed by shift name
    pub default_notes: BTreeMap<String, String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            notice_secs: DEFAULT_NOTICE_SECS,
            default_notes: BTreeMap::new(),
        }
    }
}

/// Display settings.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DisplayConfig {
    /// Dark theme preference
    pub dark_mode: bool,
    /// Site name shown in headers (null = "blog")
    pub root_name: Option<String>,
}

/// Behavior defaults.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress hints
    pub quiet: bool,
}

// ============================================================================
// Config Source Tracking
// ============================================================================

/// Source of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default
    Default,
    /// User global config (~/.config/blogdesk/config.yaml)
    UserGlobal,
    /// Project manifest (.blogdesk/config.yaml)
    ProjectManifest(String),
    /// Environment variable
    EnvVar(String),
    /// Global CLI flag, by name
    CliFlag(&'static str),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::UserGlobal => write!(f, "~/.config/blogdesk/config.yaml"),
            ConfigSource::ProjectManifest(path) => write!(f, "{}", path),
            ConfigSource::EnvVar(name) => write!(f, "${}", name),
            ConfigSource::CliFlag(flag) => write!(f, "{}", flag),
        }
    }
}

// ============================================================================
// Environment Variable Registry
// ============================================================================

/// Environment variable definition for documentation.
pub struct EnvVar {
    /// Variable name (e.g., "BLOGDESK_FORMAT")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Default value or behavior
    pub default: &'static str,
    /// Config path this maps to (e.g., "api.base_url")
    pub config_path: &'static str,
    /// Valid values (if enumerable)
    pub values: Option<&'static str>,
}

/// Registry of all supported environment variables.
pub const ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: "NO_COLOR",
        description: "Disable colored output (standard)",
        default: "unset",
        config_path: "display.color",
        values: Some("any non-empty value"),
    },
    EnvVar {
        name: "BLOGDESK_FORMAT",
        description: "Default output format",
        default: "pretty (auto-detects TTY)",
        config_path: "display.format",
        values: Some("pretty, plain, json, yaml"),
    },
    EnvVar {
        name: "BLOGDESK_API_URL",
        description: "Backend base URL",
        default: DEFAULT_BASE_URL,
        config_path: "api.base_url",
        values: Some("URL"),
    },
    EnvVar {
        name: "BLOGDESK_TIMEOUT",
        description: "Request timeout in seconds",
        default: "10",
        config_path: "api.timeout_secs",
        values: Some("number"),
    },
    EnvVar {
        name: "BLOGDESK_TOKEN",
        description: "Bearer token, used instead of the stored session",
        default: "unset",
        config_path: "session.token",
        values: None,
    },
    EnvVar {
        name: "BLOGDESK_DARK",
        description: "Dark theme preference",
        default: "false",
        config_path: "display.dark_mode",
        values: Some("1, true, yes"),
    },
    EnvVar {
        name: "BLOGDESK_QUIET",
        description: "Suppress hint messages",
        default: "false",
        config_path: "behavior.quiet",
        values: Some("1, true, yes"),
    },
    EnvVar {
        name: "BLOGDESK_DATA_DIR",
        description: "Directory for the stored session and schedule",
        default: "platform data dir (~/.local/share/blogdesk)",
        config_path: "store.dir",
        values: Some("path"),
    },
];

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Parse a boolean environment variable.
///
/// Returns `Some(true)` if the variable is set to a truthy value (1, true, yes),
/// `Some(false)` if set to a falsy value (0, false, no),
/// and `None` if unset or empty.
pub fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| {
        if v.is_empty() {
            return None;
        }
        match v.to_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    })
}

/// Parse a string environment variable.
///
/// Returns `Some(value)` if set and non-empty, `None` otherwise.
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse a u64 environment variable.
pub fn env_u64(name: &str) -> Option<u64> {
    env_string(name).and_then(|v| v.parse().ok())
}

/// Check if a string environment variable is set and non-empty.
pub fn env_is_set(name: &str) -> bool {
    std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}

// ============================================================================
// Config Loading
// ============================================================================

/// Manifest file name within .blogdesk/
pub const MANIFEST_FILE: &str = "config.yaml";

/// Config directory name
pub const CONFIG_DIR: &str = ".blogdesk";

/// Load configuration from files and the environment.
///
/// Resolution order (later overrides earlier):
/// 1. Built-in defaults
/// 2. User global (~/.config/blogdesk/config.yaml)
/// 3. Project manifests (walk from the filesystem root to cwd)
/// 4. BLOGDESK_* environment variables
///
/// Global CLI flags are layered on top with `apply_flags`.
pub fn load_config(cwd: &Path) -> LoadedConfig {
    let mut config = Config::default();
    let mut sources = vec![ConfigSource::Default];

    if let Some(user_config_path) = user_config_path() {
        if let Some(user_config) = load_manifest(&user_config_path) {
            merge(&mut config, &user_config);
            sources.push(ConfigSource::UserGlobal);
        }
    }

    for path in collect_manifest_paths(cwd) {
        if let Some(manifest_config) = load_manifest(&path) {
            merge(&mut config, &manifest_config);
            sources.push(ConfigSource::ProjectManifest(
                path.to_string_lossy().to_string(),
            ));
        }
    }

    sources.extend(apply_env(&mut config));

    for source in &sources {
        log::debug!("config source: {}", source);
    }

    LoadedConfig { config, sources }
}

/// Apply the global `--api-url` and `--dark` flags, highest precedence.
pub fn apply_flags(loaded: &mut LoadedConfig, api_url: Option<String>, dark: bool) {
    let mut applied = Vec::new();
    if let Some(url) = api_url {
        loaded.config.api.base_url = url;
        applied.push(ConfigSource::CliFlag("--api-url"));
    }
    if dark {
        loaded.config.display.dark_mode = true;
        applied.push(ConfigSource::CliFlag("--dark"));
    }
    for source in applied {
        log::debug!("config source: {}", source);
        loaded.sources.push(source);
    }
}

/// Result of loading configuration with source tracking.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: Config,
    /// Sources that contributed to this config (in order of application)
    pub sources: Vec<ConfigSource>,
}

/// Get the user config file path (~/.config/blogdesk/config.yaml).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("blogdesk").join("config.yaml"))
}

/// Load a manifest file, returning None if it doesn't exist or can't be parsed.
pub fn load_manifest(path: &Path) -> Option<Config> {
    let content = fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

/// Collect manifest paths from the filesystem root down to cwd (inclusive).
fn collect_manifest_paths(cwd: &Path) -> Vec<PathBuf> {
    let cwd = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());

    let mut paths: Vec<PathBuf> = cwd
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(MANIFEST_FILE))
        .filter(|p| p.is_file())
        .collect();
    paths.reverse();
    paths
}

/// Apply BLOGDESK_* overrides, returning the variables that took effect.
fn apply_env(config: &mut Config) -> Vec<ConfigSource> {
    let mut applied = Vec::new();

    if let Some(url) = env_string("BLOGDESK_API_URL") {
        config.api.base_url = url;
        applied.push(ConfigSource::EnvVar("BLOGDESK_API_URL".to_string()));
    }
    if let Some(secs) = env_u64("BLOGDESK_TIMEOUT") {
        config.api.timeout_secs = secs;
        applied.push(ConfigSource::EnvVar("BLOGDESK_TIMEOUT".to_string()));
    }
    if let Some(dark) = env_bool("BLOGDESK_DARK") {
        config.display.dark_mode = dark;
        applied.push(ConfigSource::EnvVar("BLOGDESK_DARK".to_string()));
    }
    if let Some(quiet) = env_bool("BLOGDESK_QUIET") {
        config.behavior.quiet = quiet;
        applied.push(ConfigSource::EnvVar("BLOGDESK_QUIET".to_string()));
    }

    applied
}

/// Merge overlay config into base config.
///
/// Non-default values in overlay override values in base.
/// Default notes are merged per shift.
pub fn merge(base: &mut Config, overlay: &Config) {
    let default_api = ApiConfig::default();
    if overlay.api.base_url != default_api.base_url {
        base.api.base_url = overlay.api.base_url.clone();
    }
    if overlay.api.timeout_secs != default_api.timeout_secs {
        base.api.timeout_secs = overlay.api.timeout_secs;
    }

    if overlay.toc.scroll_offset != TocConfig::default().scroll_offset {
        base.toc.scroll_offset = overlay.toc.scroll_offset;
    }

    if overlay.schedule.notice_secs != ScheduleConfig::default().notice_secs {
        base.schedule.notice_secs = overlay.schedule.notice_secs;
    }
    for (shift, note) in &overlay.schedule.default_notes {
        base.schedule
            .default_notes
            .insert(shift.clone(), note.clone());
    }

    if overlay.display.dark_mode {
        base.display.dark_mode = true;
    }
    if overlay.display.root_name.is_some() {
        base.display.root_name = overlay.display.root_name.clone();
    }

    if overlay.behavior.quiet {
        base.behavior.quiet = true;
    }
}

/// Generate JSON schema for the config.
pub fn json_schema() -> String {
    let schema = schemars::schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Check if quiet mode is enabled (suppress hints).
pub fn is_quiet(config: &Config) -> bool {
    config.behavior.quiet
}

/// Get the display name for the site.
pub fn root_name(config: &Config) -> &str {
    config.display.root_name.as_deref().unwrap_or("blog")
}

/// Request timeout as a `Duration`.
pub fn timeout(config: &Config) -> Duration {
    Duration::from_secs(config.api.timeout_secs)
}

/// Generate a template manifest with comments.
pub fn template_manifest() -> String {
    format!(
        r#"# blogdesk configuration
# Place in .blogdesk/config.yaml (project) or ~/.config/blogdesk/config.yaml

# Backend connection
# api:
#   base_url: {base_url}
#   timeout_secs: {timeout}

# Table of contents
# toc:
#   scroll_offset: {offset}   # pixels kept above a heading

# Schedule import
# schedule:
#   notice_secs: {notice}
#   default_notes:          # note used when a row leaves it empty
#     A班: 早班学习计划

# Display settings
# display:
#   dark_mode: false
#   root_name: null         # site name in headers (null = "blog")

# Behavior settings
# behavior:
#   quiet: false
"#,
        base_url = DEFAULT_BASE_URL,
        timeout = DEFAULT_TIMEOUT_SECS,
        offset = DEFAULT_SCROLL_OFFSET,
        notice = DEFAULT_NOTICE_SECS,
    )
}

// ============================================================================
// Tests
// ============================================================================
