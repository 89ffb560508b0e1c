/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Configuration for views.
//!
//! A configuration is always passed explicitly: views built without
//! one use [`Config::default`]. Settings may be loaded from the
//! environment ([`Config::from_env`], or the cached [`Config::global`])
//! or from YAML. Every view carries the configuration it was created
//! with and hands it down to its subviews.

use std::env;
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable overriding [`Config::default_readonly`].
pub const DEFAULT_READONLY_ENV: &str = "ARRAYVIEW_DEFAULT_READONLY";

/// Environment variable overriding [`Config::max_depth`].
pub const MAX_DEPTH_ENV: &str = "ARRAYVIEW_MAX_DEPTH";

static GLOBAL: LazyLock<Config> = LazyLock::new(Config::from_env);

/// View configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether root views over raw storage are readonly unless
    /// requested otherwise.
    pub default_readonly: bool,
    /// The maximum number of selector layers between a view and its
    /// storage. `usize::MAX` means no limit.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_readonly: false,
            max_depth: usize::MAX,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration in the environment, read once per process.
    /// Nothing in this crate consults it implicitly; pass it to
    /// [`crate::View::with_config`] or [`crate::to_view_with_config`].
    pub fn global() -> Config {
        *GLOBAL
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Unparseable values are ignored.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup(DEFAULT_READONLY_ENV) {
            match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => config.default_readonly = true,
                "0" | "false" => config.default_readonly = false,
                _ => tracing::warn!(
                    key = DEFAULT_READONLY_ENV,
                    value = %val,
                    "ignoring unparseable config value"
                ),
            }
        }

        if let Some(val) = lookup(MAX_DEPTH_ENV) {
            match val.trim().parse::<usize>() {
                Ok(parsed) => config.max_depth = parsed,
                Err(_) => tracing::warn!(
                    key = MAX_DEPTH_ENV,
                    value = %val,
                    "ignoring unparseable config value"
                ),
            }
        }

        config
    }

    /// Load configuration from a YAML file. Missing keys take their
    /// default values.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Merge with another configuration. Values in `other` that differ
    /// from the defaults take precedence.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();
        if other.default_readonly != defaults.default_readonly {
            self.default_readonly = other.default_readonly;
        }
        if other.max_depth != defaults.max_depth {
            self.max_depth = other.max_depth;
        }
    }

    pub fn with_default_readonly(self, default_readonly: bool) -> Self {
        Self {
            default_readonly,
            ..self
        }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tracing_test::traced_test;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert!(!config.default_readonly);
        assert_eq!(config.max_depth, usize::MAX);
        assert_eq!(Config::from_lookup(lookup(&[])), config);
    }

    #[test]
    fn test_from_env_values() {
        let config = Config::from_lookup(lookup(&[
            (DEFAULT_READONLY_ENV, "true"),
            (MAX_DEPTH_ENV, "8"),
        ]));
        assert!(config.default_readonly);
        assert_eq!(config.max_depth, 8);

        let config = Config::from_lookup(lookup(&[(DEFAULT_READONLY_ENV, "0")]));
        assert!(!config.default_readonly);
    }

    #[test]
    #[traced_test]
    fn test_from_env_ignores_garbage() {
        let config = Config::from_lookup(lookup(&[
            (DEFAULT_READONLY_ENV, "maybe"),
            (MAX_DEPTH_ENV, "-3"),
        ]));
        assert_eq!(config, Config::default());
        assert!(logs_contain("ignoring unparseable config value"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrayview.yaml");
        let config = Config::new().with_max_depth(3).with_default_readonly(true);
        config.to_yaml(&path).unwrap();
        assert_eq!(Config::from_yaml(&path).unwrap(), config);
    }

    #[test]
    fn test_yaml_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrayview.yaml");
        std::fs::write(&path, "max_depth: 5\n").unwrap();
        let config = Config::from_yaml(&path).unwrap();
        assert_eq!(config.max_depth, 5);
        assert!(!config.default_readonly);

        assert!(Config::from_yaml(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_merge() {
        let mut config = Config::new().with_max_depth(10);
        config.merge(&Config::new().with_default_readonly(true));
        assert_eq!(config.max_depth, 10);
        assert!(config.default_readonly);

        config.merge(&Config::new().with_max_depth(2));
        assert_eq!(config.max_depth, 2);
        assert!(config.default_readonly);
    }
}
