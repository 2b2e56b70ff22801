//! Rule configuration: which rules run, and their thresholds.
//!
//! Configuration is YAML shaped like this:
//!
//! ```yaml
//! linting:
//!   searchable_identifiers: true
//!   # ...
//! geometry_validation:
//!   enabled: true
//!   geometry_coordinates_order: true
//!   # ...
//! settings:
//!   max_links: 20
//!   max_properties: 20
//! ```
//!
//! A user configuration is laid over the default one with
//! [RuleConfig::resolve]. By default this is a shallow, top-level update: an
//! override that contains a `linting` block replaces the whole default
//! `linting` block. Use [MergePolicy::Deep] to merge rule by rule instead.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// The configuration that ships with stac-check.
pub const DEFAULT_CONFIG: &str = include_str!("../stac-check.config.yml");

/// How an override configuration is laid over the default one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Top-level keys of the override replace the default's (the default).
    #[default]
    Shallow,

    /// Nested mappings are merged key by key.
    Deep,
}

/// A fully resolved rule configuration.
///
/// Resolved once and then shared, read-only, by every lint.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    linting: Map<String, Value>,
    geometry_validation: Map<String, Value>,
    max_links: usize,
    max_properties: usize,
}

impl RuleConfig {
    /// Resolves a configuration from a default document and an optional override.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_check::{MergePolicy, RuleConfig};
    ///
    /// let default = stac_check::config::default_value().unwrap();
    /// let config = RuleConfig::resolve(
    ///     default,
    ///     Some(json!({"settings": {"max_links": 5, "max_properties": 20}})),
    ///     MergePolicy::Shallow,
    /// )
    /// .unwrap();
    /// assert_eq!(config.max_links(), 5);
    /// ```
    pub fn resolve(
        default: Value,
        override_config: Option<Value>,
        policy: MergePolicy,
    ) -> Result<RuleConfig> {
        let mut config = into_mapping(default, "default configuration")?;
        if let Some(override_config) = override_config {
            let override_config = into_mapping(override_config, "override configuration")?;
            match policy {
                MergePolicy::Shallow => config.extend(override_config),
                MergePolicy::Deep => deep_merge(&mut config, override_config),
            }
        }
        RuleConfig::from_mapping(config)
    }

    /// Resolves a configuration from the default shipped with stac-check and an optional override.
    pub fn with_override(override_config: Option<Value>) -> Result<RuleConfig> {
        RuleConfig::resolve(default_value()?, override_config, MergePolicy::Shallow)
    }

    fn from_mapping(mut config: Map<String, Value>) -> Result<RuleConfig> {
        let linting = take_mapping(&mut config, "linting")?;
        let geometry_validation = take_mapping(&mut config, "geometry_validation")?;
        let settings = take_mapping(&mut config, "settings")?;
        Ok(RuleConfig {
            linting,
            geometry_validation,
            max_links: setting(&settings, "max_links")?,
            max_properties: setting(&settings, "max_properties")?,
        })
    }

    /// Returns whether a `linting` rule is enabled.
    ///
    /// Fails with [Error::MissingConfigKey] if the rule isn't configured.
    pub fn linting(&self, key: &str) -> Result<bool> {
        self.linting
            .get(key)
            .map(truthy)
            .ok_or_else(|| Error::MissingConfigKey(format!("linting.{key}")))
    }

    /// Returns whether a `geometry_validation` rule is enabled.
    ///
    /// Fails with [Error::MissingConfigKey] if the rule isn't configured.
    pub fn geometry_validation(&self, key: &str) -> Result<bool> {
        self.geometry_validation
            .get(key)
            .map(truthy)
            .ok_or_else(|| Error::MissingConfigKey(format!("geometry_validation.{key}")))
    }

    /// Returns whether a `geometry_validation` rule is enabled, or `default` if it isn't configured.
    pub fn geometry_validation_or(&self, key: &str, default: bool) -> bool {
        self.geometry_validation
            .get(key)
            .map(truthy)
            .unwrap_or(default)
    }

    /// Returns true unless the whole geometry validation category is switched off.
    pub fn geometry_enabled(&self) -> bool {
        self.geometry_validation_or("enabled", true)
    }

    /// The number of links above which a document counts as bloated.
    pub fn max_links(&self) -> usize {
        self.max_links
    }

    /// The number of properties above which a document counts as bloated.
    pub fn max_properties(&self) -> usize {
        self.max_properties
    }
}

impl Default for RuleConfig {
    fn default() -> RuleConfig {
        let linting = [
            "searchable_identifiers",
            "percent_encoded",
            "item_id_file_name",
            "catalog_id_file_name",
            "check_summaries",
            "null_datetime",
            "check_unlocated",
            "check_geometry",
            "bloated_links",
            "bloated_metadata",
            "check_thumbnail",
            "links_title",
            "links_self",
        ];
        let geometry_validation = [
            "enabled",
            "check_bbox_geometry_match",
            "geometry_coordinates_order",
            "geometry_coordinates_definite_errors",
            "check_bbox_antimeridian",
        ];
        RuleConfig {
            linting: linting
                .into_iter()
                .map(|key| (key.to_string(), Value::Bool(true)))
                .collect(),
            geometry_validation: geometry_validation
                .into_iter()
                .map(|key| (key.to_string(), Value::Bool(true)))
                .collect(),
            max_links: 20,
            max_properties: 20,
        }
    }
}

/// Parses the configuration that ships with stac-check.
pub fn default_value() -> Result<Value> {
    from_yaml_str(DEFAULT_CONFIG)
}

/// Parses a YAML configuration document.
pub fn from_yaml_str(s: &str) -> Result<Value> {
    serde_yaml::from_str(s).map_err(Error::from)
}

/// Reads and parses a YAML configuration file.
pub fn read_yaml(path: impl AsRef<Path>) -> Result<Value> {
    let s = std::fs::read_to_string(path)?;
    from_yaml_str(&s)
}

fn into_mapping(value: Value, name: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(object) => Ok(object),
        // An empty YAML file
        Value::Null => Ok(Map::new()),
        _ => Err(Error::InvalidConfig(format!("{name} is not a mapping"))),
    }
}

fn take_mapping(config: &mut Map<String, Value>, key: &str) -> Result<Map<String, Value>> {
    match config.remove(key) {
        Some(Value::Object(object)) => Ok(object),
        Some(Value::Null) | None => Err(Error::MissingConfigKey(key.to_string())),
        Some(_) => Err(Error::InvalidConfig(format!("{key} is not a mapping"))),
    }
}

fn setting(settings: &Map<String, Value>, key: &str) -> Result<usize> {
    let value = settings
        .get(key)
        .ok_or_else(|| Error::MissingConfigKey(format!("settings.{key}")))?;
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            Error::InvalidConfig(format!("settings.{key} is not a non-negative integer"))
        })
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn deep_merge(base: &mut Map<String, Value>, other: Map<String, Value>) {
    for (key, value) in other {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(base)), Value::Object(other)) => deep_merge(base, other),
            (_, value) => {
                let _ = base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MergePolicy, RuleConfig};
    use crate::Error;
    use serde_json::json;

    #[test]
    fn default_config_parses() {
        let config = RuleConfig::with_override(None).unwrap();
        assert_eq!(config, RuleConfig::default());
    }

    #[test]
    fn shallow_merge_replaces_whole_blocks() {
        let config = RuleConfig::resolve(
            super::default_value().unwrap(),
            Some(json!({"linting": {"searchable_identifiers": false}})),
            MergePolicy::Shallow,
        )
        .unwrap();
        assert!(!config.linting("searchable_identifiers").unwrap());
        assert!(matches!(
            config.linting("percent_encoded").unwrap_err(),
            Error::MissingConfigKey(key) if key == "linting.percent_encoded"
        ));
        assert!(config.geometry_validation("geometry_coordinates_order").unwrap());
    }

    #[test]
    fn deep_merge_keeps_other_rules() {
        let config = RuleConfig::resolve(
            super::default_value().unwrap(),
            Some(json!({"linting": {"searchable_identifiers": false}})),
            MergePolicy::Deep,
        )
        .unwrap();
        assert!(!config.linting("searchable_identifiers").unwrap());
        assert!(config.linting("percent_encoded").unwrap());
    }

    #[test]
    fn unknown_keys_are_kept_but_unused() {
        let config = RuleConfig::resolve(
            super::default_value().unwrap(),
            Some(json!({"something_else": {"a": 1}})),
            MergePolicy::Shallow,
        )
        .unwrap();
        assert_eq!(config, RuleConfig::default());
    }

    #[test]
    fn settings() {
        let config = RuleConfig::resolve(
            super::default_value().unwrap(),
            Some(json!({"settings": {"max_links": 3, "max_properties": 4}})),
            MergePolicy::Shallow,
        )
        .unwrap();
        assert_eq!(config.max_links(), 3);
        assert_eq!(config.max_properties(), 4);
    }

    #[test]
    fn missing_settings() {
        let error = RuleConfig::resolve(
            super::default_value().unwrap(),
            Some(json!({"settings": {"max_links": 3}})),
            MergePolicy::Shallow,
        )
        .unwrap_err();
        assert!(matches!(error, Error::MissingConfigKey(key) if key == "settings.max_properties"));
    }

    #[test]
    fn missing_block() {
        let error = RuleConfig::resolve(json!({"linting": {}}), None, MergePolicy::Shallow)
            .unwrap_err();
        assert!(matches!(error, Error::MissingConfigKey(key) if key == "geometry_validation"));
    }

    #[test]
    fn not_a_mapping() {
        assert!(matches!(
            RuleConfig::resolve(json!([1, 2]), None, MergePolicy::Shallow).unwrap_err(),
            Error::InvalidConfig(_)
        ));
    }

    #[test]
    fn geometry_defaults() {
        let config = RuleConfig::resolve(
            super::default_value().unwrap(),
            Some(json!({"geometry_validation": {"geometry_coordinates_order": true}})),
            MergePolicy::Shallow,
        )
        .unwrap();
        assert!(config.geometry_enabled());
        assert!(config.geometry_validation_or("check_bbox_antimeridian", true));
        assert!(
            config
                .geometry_validation("geometry_coordinates_definite_errors")
                .is_err()
        );
    }

    #[test]
    fn read_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stac-check.config.yml");
        std::fs::write(&path, "settings:\n  max_links: 1\n  max_properties: 2\n").unwrap();
        let value = super::read_yaml(&path).unwrap();
        let config =
            RuleConfig::resolve(super::default_value().unwrap(), Some(value), MergePolicy::Shallow)
                .unwrap();
        assert_eq!(config.max_links(), 1);
    }
}
