//! Layered configuration for selection runs.
//!
//! Layers merge lowest to highest: defaults, `ssel.yaml`, `SSEL_*`
//! environment variables, then CLI flags.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::distribute::DistributionStrategy;
use crate::error::{Result, SelectError};
use crate::model::split_and_trim_tags;
use crate::select::SelectionConfig;

/// Project config file looked up in the working directory.
pub const PROJECT_CONFIG_FILENAME: &str = "ssel.yaml";

const ENV_PREFIX: &str = "SSEL_";

const KNOWN_KEYS: &[&str] = &[
    "tags",
    "scenarios",
    "lines",
    "suite-tags",
    "parallel-streams",
    "group",
    "strategy",
];

/// A flat `key -> value` configuration layer.
///
/// Keys are stored normalized: lowercase with `-` separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set a key, normalizing its spelling.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `SSEL_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from explicit `(name, value)` pairs, as `from_env` does.
    #[must_use]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.set(stripped, value);
            }
        }
        layer
    }

    /// Resolve the merged layer into typed selection settings.
    ///
    /// # Errors
    ///
    /// Returns `SelectError::Config` for unparsable numbers or an unknown
    /// strategy.
    pub fn to_selection_config(&self) -> Result<SelectionConfig> {
        let defaults = SelectionConfig::default();

        let lines = match self.get("lines") {
            Some(raw) => parse_list(raw)
                .into_iter()
                .map(|line| parse_number("lines", &line))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let parallel_streams = match self.get("parallel-streams") {
            Some(raw) if !raw.trim().is_empty() => parse_number("parallel-streams", raw)?,
            _ => defaults.parallel_streams,
        };

        let group = match self.get("group") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_number("group", raw)?),
            _ => None,
        };

        let strategy = match self.get("strategy") {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<DistributionStrategy>()?,
            _ => defaults.strategy,
        };

        for key in self.values.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!(key, "Ignoring unknown config key");
            }
        }

        Ok(SelectionConfig {
            tags: self.get("tags").unwrap_or_default().to_string(),
            scenarios: self.get("scenarios").map(parse_list).unwrap_or_default(),
            lines,
            suite_tags: self.get("suite-tags").map(parse_list).unwrap_or_default(),
            parallel_streams,
            group,
            strategy,
        })
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub tags: Option<String>,
    pub scenarios: Vec<String>,
    pub lines: Vec<usize>,
    pub parallel_streams: Option<usize>,
    pub group: Option<usize>,
    pub strategy: Option<DistributionStrategy>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(tags) = &self.tags {
            layer.set("tags", tags.clone());
        }
        if !self.scenarios.is_empty() {
            layer.set("scenarios", encode_list(&self.scenarios));
        }
        if !self.lines.is_empty() {
            let lines: Vec<String> = self.lines.iter().map(ToString::to_string).collect();
            layer.set("lines", encode_list(&lines));
        }
        if let Some(streams) = self.parallel_streams {
            layer.set("parallel-streams", streams.to_string());
        }
        if let Some(group) = self.group {
            layer.set("group", group.to_string());
        }
        if let Some(strategy) = self.strategy {
            layer.set("strategy", strategy.as_str());
        }

        layer
    }
}

/// Built-in defaults, the lowest layer.
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set("parallel-streams", "1");
    layer.set("strategy", DistributionStrategy::default().as_str());
    layer
}

/// Load the project config: `explicit` if given, else `ssel.yaml` in `cwd`.
///
/// # Errors
///
/// Returns an error if an explicit path is missing, or if the file cannot
/// be read or parsed.
pub fn load_project_config(explicit: Option<&Path>, cwd: &Path) -> Result<ConfigLayer> {
    match explicit {
        Some(path) if !path.exists() => Err(SelectError::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => ConfigLayer::from_yaml(path),
        None => ConfigLayer::from_yaml(&cwd.join(PROJECT_CONFIG_FILENAME)),
    }
}

/// Load and merge every layer.
///
/// # Errors
///
/// Returns an error if the project config cannot be loaded.
pub fn load_config(
    explicit: Option<&PathBuf>,
    cwd: &Path,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let project = load_project_config(explicit.map(PathBuf::as_path), cwd)?;
    let env_layer = ConfigLayer::from_env();
    let merged = ConfigLayer::merge_layers(&[
        default_config_layer(),
        project,
        env_layer,
        cli.as_layer(),
    ]);
    debug!(keys = merged.values.len(), "Loaded configuration");
    Ok(merged)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

/// Encode a list as a JSON array so items may themselves contain commas.
fn encode_list(items: &[String]) -> String {
    serde_json::Value::from(items.to_vec()).to_string()
}

/// Decode a list value: a JSON array from YAML or CLI layers, otherwise a
/// comma-separated string (environment variables).
fn parse_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let items = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<String>>(trimmed)
            .map(|items| items.into_iter().map(|item| item.trim().to_string()).collect())
            .unwrap_or_else(|_| split_and_trim_tags(raw))
    } else {
        split_and_trim_tags(raw)
    };
    items.into_iter().filter(|item| !item.is_empty()).collect()
}

fn parse_number(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| SelectError::Config(format!("{key}: '{}' is not a number", raw.trim())))
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    let mut layer = ConfigLayer::default();
    for (key, value) in flat {
        layer.set(&key, value);
    }
    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let items: Vec<String> = values.iter().filter_map(yaml_scalar_to_string).collect();
            out.insert(prefix.to_string(), encode_list(&items));
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
