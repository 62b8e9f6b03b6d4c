//! rclkit library
//!
//! Small, stateless helpers (deep cloning, email validation, date
//! formatting, input sanitizing) plus an environment-keyed configuration
//! loader with feature flags.
//!
//! Modules are exposed for integration testing.

pub mod config;
pub mod error;
pub mod features;
pub mod stores;
pub mod traits;
pub mod utils;
pub mod value;

// Re-export commonly used types
pub use config::{load_config, AppConfig, ConfigLoader, Environment, LogLevel, SettingsFile};
pub use error::HelperError;
pub use features::{create_feature_manager, FeatureManager};
pub use stores::{ProcessEnv, StdFileStore};
pub use traits::{EnvSource, FileStore};
pub use utils::cloning::deep_clone;
pub use utils::formatting::format_date;
pub use utils::validation::{is_valid_email, sanitize_input};
pub use value::{Array, Date, Object, Value};
