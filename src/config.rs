//! Configuration Snapshot - The Pricing Sheet
//!
//! A flat key -> value table of rates, speeds, times and multipliers.
//! Every numeric read supplies its own literal fallback; a partial sheet is
//! normal, not an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cell of the pricing sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Numeric reading of the cell. Text that does not parse yields NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            ConfigValue::Number(n) => *n,
            ConfigValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, ConfigValue::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Text(s.to_string())
    }
}

/// Immutable view of a product tab for the duration of one calculation.
///
/// Keys are kept ordered so that key scans (bracket lookup) are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    values: BTreeMap<String, ConfigValue>,
}

impl ConfigSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builder-style insert, mostly for tests and embedded defaults.
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key).filter(|v| !v.is_blank())
    }

    /// A key counts as present unless missing or blank.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Numeric value of `key`, or `default` when the key is absent.
    pub fn num(&self, key: &str, default: f64) -> f64 {
        self.get(key).map_or(default, ConfigValue::as_f64)
    }

    pub fn opt_num(&self, key: &str) -> Option<f64> {
        self.get(key).map(ConfigValue::as_f64)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
