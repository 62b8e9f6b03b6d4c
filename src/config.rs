//! Configuration management
//!
//! Resolves the application configuration for a named environment from a
//! static table, then applies optional overrides: the `API_URL` variable
//! (production only) and a YAML settings file.
//!
//! Environment variables are never read implicitly. Callers capture them
//! through an [`EnvSource`] and hand them to a [`ConfigLoader`].
//!
//! The settings file lives in a platform-specific directory:
//! - macOS: `~/Library/Application Support/rcl/settings.yaml`
//! - Linux: `~/.config/rcl/settings.yaml`
//! - Windows: `%APPDATA%\rcl\settings.yaml`

use crate::features::FeatureManager;
use crate::stores::StdFileStore;
use crate::traits::{EnvSource, FileStore};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_NAME: &str = "RCL";
pub const APP_VERSION: &str = "1.0.0";

/// Variable naming the environment to load when none is given
pub const ENV_NAME_VAR: &str = "APP_ENV";
/// Variable overriding the production API URL
pub const API_URL_VAR: &str = "API_URL";

const DEVELOPMENT_API_URL: &str = "http://localhost:3000";
const PRODUCTION_API_URL: &str = "https://api.example.com";
const TEST_API_URL: &str = "http://localhost:3001";

/// A deployment environment with its own configuration entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Production,
        Environment::Test,
    ];

    /// Maps an environment name to its entry
    ///
    /// Names are matched exactly. Anything unrecognized selects
    /// `Development`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "development" => Environment::Development,
            "production" => Environment::Production,
            "test" => Environment::Test,
            other => {
                debug!(environment = other, "unrecognized environment, using development");
                Environment::Development
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity of application logging
///
/// The lowercase name doubles as a `tracing` filter directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    pub version: String,
    pub debug: bool,
    pub log_level: LogLevel,
    pub api_url: String,
    /// Feature flags by name; see [`FeatureManager`]
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, JsonValue>,
}

impl AppConfig {
    /// The built-in entry for `environment`, with no overrides
    pub fn for_environment(environment: Environment) -> Self {
        let (debug, log_level, api_url) = match environment {
            Environment::Development => (true, LogLevel::Debug, DEVELOPMENT_API_URL),
            Environment::Production => (false, LogLevel::Error, PRODUCTION_API_URL),
            Environment::Test => (false, LogLevel::Error, TEST_API_URL),
        };

        AppConfig {
            app_name: APP_NAME.to_string(),
            version: APP_VERSION.to_string(),
            debug,
            log_level,
            api_url: api_url.to_string(),
            features: BTreeMap::new(),
        }
    }

    /// Overlays the values present in a settings file
    ///
    /// Feature flags are merged; a flag in the file replaces one of the
    /// same name.
    pub fn apply_settings(&mut self, settings: &SettingsFile) {
        if let Some(debug) = settings.debug {
            self.debug = debug;
        }
        if let Some(log_level) = settings.log_level {
            self.log_level = log_level;
        }
        if let Some(api_url) = &settings.api_url {
            self.api_url = api_url.clone();
        }
        self.features.extend(
            settings
                .features
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
    }

    /// Feature flag accessor over this configuration
    pub fn feature_manager(&self) -> FeatureManager<'_> {
        FeatureManager::new(&self.features)
    }
}

/// Loads the built-in configuration for an environment name
///
/// Unrecognized names fall back to the development entry, so
/// `load_config("unknown-env") == load_config("development")`.
pub fn load_config(env_name: &str) -> AppConfig {
    AppConfig::for_environment(Environment::from_name(env_name))
}

/// Builds configurations from the static table plus explicit overrides
///
/// Overrides apply in order: table entry, `API_URL` (production only),
/// settings file.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    default_env: Option<String>,
    api_url: Option<String>,
    settings: Option<SettingsFile>,
}

impl ConfigLoader {
    /// A loader with no overrides; equivalent to [`load_config`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures `APP_ENV` and `API_URL` from `env`
    ///
    /// Empty values are treated as unset.
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let non_empty = |key: &str| env.var(key).filter(|value| !value.is_empty());
        ConfigLoader {
            default_env: non_empty(ENV_NAME_VAR),
            api_url: non_empty(API_URL_VAR),
            settings: None,
        }
    }

    /// Overrides the production API URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Applies `settings` on top of every loaded configuration
    pub fn with_settings(mut self, settings: SettingsFile) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Environment name used by [`ConfigLoader::load_default`]
    pub fn default_env_name(&self) -> &str {
        self.default_env
            .as_deref()
            .unwrap_or(Environment::Development.as_str())
    }

    /// Resolves the configuration for `env_name`
    pub fn load(&self, env_name: &str) -> AppConfig {
        let environment = Environment::from_name(env_name);
        let mut config = AppConfig::for_environment(environment);

        if environment == Environment::Production {
            if let Some(api_url) = &self.api_url {
                config.api_url = api_url.clone();
            }
        }
        if let Some(settings) = &self.settings {
            config.apply_settings(settings);
        }

        debug!(environment = %environment, api_url = %config.api_url, "configuration loaded");
        config
    }

    /// Resolves the configuration for the captured `APP_ENV`, or development
    pub fn load_default(&self) -> AppConfig {
        self.load(self.default_env_name())
    }
}

/// Optional user settings, persisted as YAML
///
/// Every field is optional; absent fields leave the table value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, JsonValue>,
}

impl SettingsFile {
    /// Loads settings from the default location
    ///
    /// # Errors
    /// See [`SettingsFile::load_from`] and [`SettingsFile::default_path`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads settings from `path` on the local filesystem
    ///
    /// See [`SettingsFile::load_with`].
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with(&StdFileStore, path)
    }

    /// Loads settings from `path` through `store`
    ///
    /// # Returns
    /// - `Ok(SettingsFile)` with the parsed settings, or empty settings if the
    ///   file doesn't exist or is blank
    /// - `Err` if the file exists but cannot be read or parsed
    pub fn load_with(store: &dyn FileStore, path: &Path) -> Result<Self> {
        let contents = match store
            .read(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?
        {
            Some(contents) => contents,
            None => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Saves the settings as YAML to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, store: &dyn FileStore, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            store.create_dir_all(parent)?;
        }

        let contents = serde_yaml::to_string(self).context("Failed to serialize settings")?;
        store.write(path, &contents)
    }

    /// Returns the platform-specific settings file path
    ///
    /// Falls back to `~/.config/rcl/settings.yaml` if platform detection fails.
    ///
    /// # Errors
    /// Returns an error if the HOME environment variable is not set (fallback case only).
    pub fn default_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "rcl") {
            Ok(proj_dirs.config_dir().join("settings.yaml"))
        } else {
            let home = std::env::var("HOME").context("HOME not set")?;
            Ok(PathBuf::from(home).join(".config/rcl/settings.yaml"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory file store
    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    impl FileStore for MemoryStore {
        fn read(&self, path: &Path) -> Result<Option<String>> {
            Ok(self.files.lock().unwrap().get(path).cloned())
        }

        fn write(&self, path: &Path, content: &str) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn create_dir_all(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_table() {
        let dev = load_config("development");
        assert_eq!(dev.app_name, "RCL");
        assert_eq!(dev.version, "1.0.0");
        assert!(dev.debug);
        assert_eq!(dev.log_level, LogLevel::Debug);
        assert_eq!(dev.api_url, "http://localhost:3000");

        let prod = load_config("production");
        assert!(!prod.debug);
        assert_eq!(prod.log_level, LogLevel::Error);
        assert_eq!(prod.api_url, "https://api.example.com");

        let test = load_config("test");
        assert!(!test.debug);
        assert_eq!(test.api_url, "http://localhost:3001");
    }

    #[test]
    fn test_unknown_environment_falls_back_to_development() {
        assert_eq!(load_config("unknown-env"), load_config("development"));
        assert_eq!(load_config("Production"), load_config("development"));
        assert_eq!(load_config(""), load_config("development"));
    }

    #[test]
    fn test_environment_names_round_trip() {
        for environment in Environment::ALL {
            assert_eq!(Environment::from_name(environment.as_str()), environment);
        }
    }

    #[test]
    fn test_api_url_override_only_affects_production() {
        let loader = ConfigLoader::from_env(&env(&[("API_URL", "https://override.test")]));

        assert_eq!(loader.load("production").api_url, "https://override.test");
        assert_eq!(loader.load("development").api_url, "http://localhost:3000");
        assert_eq!(loader.load("test").api_url, "http://localhost:3001");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let loader = ConfigLoader::from_env(&env(&[("API_URL", ""), ("APP_ENV", "")]));

        assert_eq!(loader.default_env_name(), "development");
        assert_eq!(loader.load("production").api_url, "https://api.example.com");
    }

    #[test]
    fn test_load_default_uses_app_env() {
        let loader = ConfigLoader::from_env(&env(&[("APP_ENV", "test")]));
        assert_eq!(loader.load_default(), load_config("test"));

        assert_eq!(ConfigLoader::new().load_default(), load_config("development"));
    }

    #[test]
    fn test_settings_override_table_and_env() {
        let settings = SettingsFile {
            api_url: Some("https://settings.test".to_string()),
            log_level: Some(LogLevel::Info),
            features: BTreeMap::from([("beta".to_string(), json!(true))]),
            ..SettingsFile::default()
        };
        let config = ConfigLoader::new()
            .with_api_url("https://env.test")
            .with_settings(settings)
            .load("production");

        assert_eq!(config.api_url, "https://settings.test");
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(!config.debug);
        assert!(config.feature_manager().is_enabled("beta"));
    }

    #[test]
    fn test_settings_missing_file_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let settings = SettingsFile::load_from(&temp.path().join("absent.yaml")).unwrap();
        assert_eq!(settings, SettingsFile::default());
    }

    #[test]
    fn test_settings_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rcl").join("settings.yaml");
        let settings = SettingsFile {
            debug: Some(true),
            features: BTreeMap::from([
                ("darkMode".to_string(), json!(true)),
                ("limits".to_string(), json!({"max": 5})),
            ]),
            ..SettingsFile::default()
        };

        settings.save_to(&StdFileStore, &path).unwrap();
        assert_eq!(SettingsFile::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_settings_load_and_save_share_file_store() {
        let store = MemoryStore::default();
        let path = Path::new("/virtual/rcl/settings.yaml");

        assert_eq!(SettingsFile::load_with(&store, path).unwrap(), SettingsFile::default());

        let settings = SettingsFile {
            log_level: Some(LogLevel::Trace),
            features: BTreeMap::from([("beta".to_string(), json!(true))]),
            ..SettingsFile::default()
        };
        settings.save_to(&store, path).unwrap();

        assert!(!path.exists());
        assert_eq!(SettingsFile::load_with(&store, path).unwrap(), settings);
    }

    #[test]
    fn test_settings_malformed_file_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("settings.yaml");
        std::fs::write(&path, "logLevel: [not, a, level]").unwrap();

        let err = SettingsFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let yaml = serde_yaml::to_string(&load_config("development")).unwrap();
        assert!(yaml.contains("appName: RCL"));
        assert!(yaml.contains("logLevel: debug"));
        assert!(!yaml.contains("features"));
    }
}
