//! Feature flags
//!
//! Read-only accessors over the `features` table of an [`AppConfig`].
//! A flag is enabled only when its value is exactly `true`; any other
//! value is treated as configuration data for that feature.

use crate::config::AppConfig;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Borrowing view over a feature table
#[derive(Debug, Clone, Copy)]
pub struct FeatureManager<'a> {
    features: &'a BTreeMap<String, JsonValue>,
}

impl<'a> FeatureManager<'a> {
    pub fn new(features: &'a BTreeMap<String, JsonValue>) -> Self {
        FeatureManager { features }
    }

    /// Returns `true` only if the flag is set to the boolean `true`
    ///
    /// Strings such as `"true"`, numbers and objects do not enable a flag.
    pub fn is_enabled(&self, name: &str) -> bool {
        matches!(self.features.get(name), Some(JsonValue::Bool(true)))
    }

    /// Raw configuration value of a feature, `None` if it is not declared
    pub fn feature_config(&self, name: &str) -> Option<&'a JsonValue> {
        self.features.get(name)
    }

    /// Names of the enabled features, in name order
    pub fn enabled_features(&self) -> impl Iterator<Item = &'a str> + 'a {
        let features = self.features;
        features
            .iter()
            .filter(|(_, value)| matches!(value, JsonValue::Bool(true)))
            .map(|(name, _)| name.as_str())
    }
}

/// Creates a feature manager over `config.features`
pub fn create_feature_manager(config: &AppConfig) -> FeatureManager<'_> {
    FeatureManager::new(&config.features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use serde_json::json;

    fn config_with(features: JsonValue) -> AppConfig {
        let mut config = load_config("test");
        if let JsonValue::Object(map) = features {
            config.features = map.into_iter().collect();
        }
        config
    }

    #[test]
    fn test_is_enabled_requires_literal_true() {
        let config = config_with(json!({
            "on": true,
            "off": false,
            "text": "true",
            "number": 1,
            "settings": {"enabled": true},
        }));
        let features = create_feature_manager(&config);

        assert!(features.is_enabled("on"));
        assert!(!features.is_enabled("off"));
        assert!(!features.is_enabled("text"));
        assert!(!features.is_enabled("number"));
        assert!(!features.is_enabled("settings"));
        assert!(!features.is_enabled("missing"));
    }

    #[test]
    fn test_feature_config_returns_raw_value() {
        let config = config_with(json!({"limits": {"max": 10}, "on": true}));
        let features = create_feature_manager(&config);

        assert_eq!(features.feature_config("limits"), Some(&json!({"max": 10})));
        assert_eq!(features.feature_config("on"), Some(&json!(true)));
        assert_eq!(features.feature_config("missing"), None);
    }

    #[test]
    fn test_config_without_features() {
        let config = load_config("development");
        let features = config.feature_manager();

        assert!(!features.is_enabled("anything"));
        assert_eq!(features.enabled_features().count(), 0);
    }

    #[test]
    fn test_enabled_features_sorted() {
        let config = config_with(json!({"zeta": true, "alpha": true, "beta": false}));
        let enabled: Vec<&str> = create_feature_manager(&config).enabled_features().collect();
        assert_eq!(enabled, vec!["alpha", "zeta"]);
    }
}
