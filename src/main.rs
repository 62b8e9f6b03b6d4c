//! rcl - command-line front end for rclkit
//!
//! Exposes each helper as a subcommand:
//! - `email` - check the shape of an email address
//! - `date` - format a date string or timestamp as `YYYY-MM-DD`
//! - `sanitize` - HTML-escape text
//! - `clone` - deep clone a JSON document
//! - `config` / `features` - show the resolved configuration
//!
//! The environment name defaults to `APP_ENV`. Logging goes to stderr at the
//! configured `logLevel` unless `RUST_LOG` is set. The subscriber is installed
//! before configuration is resolved, at the environment's built-in level, and
//! switched to the final level once settings are applied.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rclkit::utils::validation::{escape_html, validate_email};
use rclkit::{
    create_feature_manager, deep_clone, format_date, load_config, AppConfig, ConfigLoader,
    LogLevel, ProcessEnv, SettingsFile, Value,
};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Environment to load (development, production, test)
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Settings file to apply instead of the default location
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print whether the input looks like an email address
    Email { input: String },

    /// Format a date as YYYY-MM-DD (UTC); numeric input is epoch milliseconds
    Date {
        #[arg(allow_negative_numbers = true)]
        input: String,
    },

    /// HTML-escape the input
    Sanitize { input: String },

    /// Deep clone a JSON document and print the copy
    Clone { json: String },

    /// Print the resolved configuration as YAML
    Config,

    /// List enabled feature flags
    Features,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loader = ConfigLoader::from_env(&ProcessEnv);
    let env_name = args
        .env
        .clone()
        .unwrap_or_else(|| loader.default_env_name().to_string());
    let log_handle = init_logging(load_config(&env_name).log_level);

    let config = resolve_config(loader, &env_name, args.settings.as_deref())?;
    if let Some(handle) = log_handle {
        handle
            .reload(EnvFilter::new(config.log_level.as_str()))
            .context("Failed to apply configured log level")?;
    }
    debug!(command = ?args.command, "running");

    run(args.command, &config)
}

/// Applies the settings file (explicit path or default location) and loads
/// the configuration for `env_name`
fn resolve_config(
    loader: ConfigLoader,
    env_name: &str,
    settings_path: Option<&Path>,
) -> Result<AppConfig> {
    let settings = match settings_path {
        Some(path) => SettingsFile::load_from(path)?,
        None => SettingsFile::load()?,
    };
    Ok(loader.with_settings(settings).load(env_name))
}

/// Numbers are epoch milliseconds, anything else is a date string
fn date_argument(input: &str) -> Value {
    match input.trim().parse::<f64>() {
        Ok(millis) => Value::Number(millis),
        Err(_) => Value::from(input),
    }
}

fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Email { input } => println!("{}", validate_email(&input)),
        Command::Date { input } => println!("{}", format_date(&date_argument(&input))?),
        Command::Sanitize { input } => println!("{}", escape_html(&input)),
        Command::Clone { json } => {
            let parsed: serde_json::Value =
                serde_json::from_str(&json).context("Failed to parse JSON input")?;
            let cloned = deep_clone(&Value::from(parsed));
            println!("{}", serde_json::to_string_pretty(&cloned.to_json())?);
        }
        Command::Config => print!("{}", serde_yaml::to_string(config)?),
        Command::Features => {
            for name in create_feature_manager(config).enabled_features() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

/// Installs the stderr subscriber
///
/// `RUST_LOG` wins and stays fixed. Otherwise the filter starts at `level`
/// and the returned handle switches it once the final level is known.
fn init_logging(level: LogLevel) -> Option<reload::Handle<EnvFilter, Registry>> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return None;
    }

    let (filter, handle) = reload::Layer::new(EnvFilter::new(level.as_str()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Some(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Collects formatted log output
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_date_argument_numeric_is_timestamp() {
        let value = date_argument("1763337600000");
        assert_eq!(value, Value::Number(1_763_337_600_000.0));
        assert_eq!(format_date(&value).unwrap(), "2025-11-17");

        assert_eq!(date_argument(" -86400000 "), Value::Number(-86_400_000.0));
    }

    #[test]
    fn test_date_argument_text_is_date_string() {
        assert_eq!(date_argument("2025-11-17"), Value::from("2025-11-17"));
        assert_eq!(format_date(&date_argument("2025-11-17T12:00:00Z")).unwrap(), "2025-11-17");
        assert!(format_date(&date_argument("invalid-date")).is_err());
    }

    #[test]
    fn test_date_subcommand_accepts_negative_timestamp() {
        let args = Args::try_parse_from(["rcl", "date", "-86400000"]).unwrap();
        match args.command {
            Command::Date { input } => assert_eq!(input, "-86400000"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_config_emits_diagnostics() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("settings.yaml");
        let config = tracing::subscriber::with_default(subscriber, || {
            resolve_config(ConfigLoader::new(), "staging", Some(&missing))
        })
        .unwrap();

        assert_eq!(config, load_config("development"));
        let output = logs.contents();
        assert!(output.contains("unrecognized environment"), "{}", output);
        assert!(output.contains("no settings file"), "{}", output);
        assert!(output.contains("configuration loaded"), "{}", output);
    }
}
