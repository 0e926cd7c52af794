//! Configuration management for errlog
//!
//! Configuration is read once at start-up: the TOML file first, then the
//! `ERRLOG_*` environment variables on top. It is never mutated afterwards.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::RetentionPolicy;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "ERRLOG_";

/// Where captured errors are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingMode {
    /// Every record goes to `single_log_file`
    SingleFile,
    /// Each source file gets a `<stem>_error.log` next to it
    #[default]
    PerSourceFile,
}

impl RoutingMode {
    /// Name as it appears in config files and environment variables
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingMode::SingleFile => "single-file",
            RoutingMode::PerSourceFile => "per-source-file",
        }
    }
}

impl std::str::FromStr for RoutingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-file" | "single" => Ok(RoutingMode::SingleFile),
            "per-source-file" | "per-source" => Ok(RoutingMode::PerSourceFile),
            other => bail!("Unknown routing mode '{}'", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log destination strategy
    #[serde(default)]
    pub routing_mode: RoutingMode,

    /// Destination when routing mode is single-file (default: `<log_dir>/errors.log`)
    #[serde(default)]
    pub single_log_file: Option<PathBuf>,

    /// Retention window in days; 0 disables deletion (default: 7)
    #[serde(default = "default_max_log_age_days")]
    pub max_log_age_days: u64,

    /// Directory swept for expired logs (default: ~/.errlog/logs)
    #[serde(default = "logs_dir")]
    pub log_dir: PathBuf,

    /// Base directory for relative source paths in per-source-file mode
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// Minimum tracing level forwarded to the capture handler (default: "warn")
    #[serde(default = "default_capture_level")]
    pub capture_level: String,
}

fn default_max_log_age_days() -> u64 {
    7
}

fn default_capture_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routing_mode: RoutingMode::default(),
            single_log_file: None,
            max_log_age_days: default_max_log_age_days(),
            log_dir: logs_dir(),
            source_root: None,
            capture_level: default_capture_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default file and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_file_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file, or return defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.expand_paths();
        Ok(config)
    }

    /// Apply `ERRLOG_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(mode) = var("ROUTING_MODE") {
            self.routing_mode = mode.parse().context("Invalid ERRLOG_ROUTING_MODE")?;
        }
        if let Some(file) = var("SINGLE_LOG_FILE") {
            self.single_log_file = Some(PathBuf::from(file));
        }
        if let Some(days) = var("MAX_LOG_AGE_DAYS") {
            self.max_log_age_days = days
                .trim()
                .parse()
                .with_context(|| format!("Invalid ERRLOG_MAX_LOG_AGE_DAYS '{}'", days))?;
        }
        if let Some(dir) = var("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(root) = var("SOURCE_ROOT") {
            self.source_root = Some(PathBuf::from(root));
        }
        if let Some(level) = var("CAPTURE_LEVEL") {
            self.capture_level = level;
        }

        self.expand_paths();
        Ok(())
    }

    /// Resolved single log file path
    pub fn single_log_file(&self) -> PathBuf {
        self.single_log_file
            .clone()
            .unwrap_or_else(|| self.log_dir.join("errors.log"))
    }

    /// Retention policy derived from this configuration
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_age_days: self.max_log_age_days,
            routing_mode: self.routing_mode,
            single_log_file: Some(self.single_log_file()),
        }
    }

    /// Parsed capture level
    pub fn capture_level(&self) -> Result<tracing::Level> {
        self.capture_level
            .parse()
            .with_context(|| format!("Invalid capture_level '{}'", self.capture_level))
    }

    /// Directory the retention sweep scans
    ///
    /// Per-source logs are written next to their sources, so in that mode the
    /// sweep covers `source_root` when one is configured.
    pub fn sweep_dir(&self) -> &Path {
        match (self.routing_mode, &self.source_root) {
            (RoutingMode::PerSourceFile, Some(root)) => root,
            _ => &self.log_dir,
        }
    }

    fn expand_paths(&mut self) {
        self.log_dir = expand_tilde(&self.log_dir);
        self.single_log_file = self.single_log_file.as_deref().map(expand_tilde);
        self.source_root = self.source_root.as_deref().map(expand_tilde);
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    }
}

/// Get the base configuration directory (~/.errlog)
/// Falls back to ./.errlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| PathBuf::from(".errlog"))
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".errlog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the default logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure the configured log directory exists
///
/// With the default configuration this also creates `~/.errlog`.
pub fn ensure_directories(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir).context("Failed to create logs directory")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.routing_mode, RoutingMode::PerSourceFile);
        assert_eq!(config.max_log_age_days, 7);
        assert_eq!(config.capture_level, "warn");
        assert!(config.single_log_file().ends_with("errors.log"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.routing_mode = RoutingMode::SingleFile;
        config.max_log_age_days = 30;

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("routing_mode = \"single-file\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.routing_mode, RoutingMode::SingleFile);
        assert_eq!(parsed.max_log_age_days, 30);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.max_log_age_days, 7);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "routing_mode = \"single-file\"\nsingle_log_file = \"/app/errors.log\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.routing_mode, RoutingMode::SingleFile);
        assert_eq!(config.single_log_file(), PathBuf::from("/app/errors.log"));
        assert_eq!(config.max_log_age_days, 7);
        assert_eq!(config.capture_level, "warn");
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "routing_mode = \"sideways\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("ERRLOG_ROUTING_MODE", "single-file"),
                ("ERRLOG_SINGLE_LOG_FILE", "/srv/app/errors.log"),
                ("ERRLOG_MAX_LOG_AGE_DAYS", "0"),
                ("ERRLOG_LOG_DIR", "/srv/app"),
            ]))
            .unwrap();

        assert_eq!(config.routing_mode, RoutingMode::SingleFile);
        assert_eq!(config.single_log_file(), PathBuf::from("/srv/app/errors.log"));
        assert_eq!(config.max_log_age_days, 0);
        assert_eq!(config.log_dir, PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_env_override_bad_days_errors() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(env(&[("ERRLOG_MAX_LOG_AGE_DAYS", "-3")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_bad_mode_errors() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(env(&[("ERRLOG_ROUTING_MODE", "both")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_log_file_defaults_into_log_dir() {
        let mut config = Config::default();
        config.log_dir = PathBuf::from("/var/log/app");
        assert_eq!(
            config.single_log_file(),
            PathBuf::from("/var/log/app/errors.log")
        );
    }

    #[test]
    fn test_retention_policy_from_config() {
        let mut config = Config::default();
        config.routing_mode = RoutingMode::SingleFile;
        config.max_log_age_days = 3;
        let policy = config.retention_policy();
        assert_eq!(policy.max_age_days, 3);
        assert_eq!(policy.routing_mode, RoutingMode::SingleFile);
        assert_eq!(policy.single_log_file, Some(config.single_log_file()));
    }

    #[test]
    fn test_capture_level_parsing() {
        let mut config = Config::default();
        assert_eq!(config.capture_level().unwrap(), tracing::Level::WARN);
        config.capture_level = "error".to_string();
        assert_eq!(config.capture_level().unwrap(), tracing::Level::ERROR);
    }

    #[test]
    fn test_unknown_capture_level_errors() {
        let mut config = Config::default();
        config.capture_level = "loud".to_string();
        let err = config.capture_level().unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_ensure_directories_creates_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.routing_mode = RoutingMode::SingleFile;
        config.log_dir = temp_dir.path().join("fresh").join("logs");

        ensure_directories(&config).unwrap();

        assert!(config.log_dir.is_dir());
        let handler = crate::capture::ErrorCaptureHandler::from_config(&config);
        assert!(handler.handle_error(2, "undefined variable", "/app/index.php", 10));
        let content = std::fs::read_to_string(config.single_log_file()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_sweep_dir_follows_routing_mode() {
        let mut config = Config::default();
        config.log_dir = PathBuf::from("/var/log/app");
        assert_eq!(config.sweep_dir(), Path::new("/var/log/app"));

        config.source_root = Some(PathBuf::from("/srv/app"));
        assert_eq!(config.sweep_dir(), Path::new("/srv/app"));

        config.routing_mode = RoutingMode::SingleFile;
        assert_eq!(config.sweep_dir(), Path::new("/var/log/app"));
    }

    #[test]
    fn test_per_source_logs_are_swept_from_source_root() {
        use crate::capture::TargetResolver;
        use std::time::{Duration, SystemTime};

        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.log_dir = temp_dir.path().join("logs");
        config.source_root = Some(temp_dir.path().to_path_buf());
        config.max_log_age_days = 7;

        let target = TargetResolver::from_config(&config).resolve(Path::new("index.rs"));
        assert_eq!(target, temp_dir.path().join("index_error.log"));

        let file = std::fs::File::create(&target).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(8 * 24 * 60 * 60))
            .unwrap();
        drop(file);

        let deleted = crate::logging::sweep(config.sweep_dir(), &config.retention_policy());
        assert_eq!(deleted, 1);
        assert!(!target.exists());
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".errlog"));
    }
}
