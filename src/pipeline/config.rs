//! Per-block configuration values.
//!
//! A block's configuration is stored as an ordered key → value map so that it
//! can be edited generically in the config panel and persisted as plain JSON.
//! Each block type reads it through a typed parameter record (see
//! `pipeline::transforms`) that falls back to defaults for missing keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(v) => Some(*v),
            ConfigValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Int(v) => Some(*v as f64),
            ConfigValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Non-negative integer view. Fractional floats are truncated.
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ConfigValue::Int(v) if *v >= 0 => Some(*v as usize),
            ConfigValue::Float(v) if v.is_finite() && *v >= 0.0 => Some(v.trunc() as usize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ConfigValue::Int(_) | ConfigValue::Float(_))
    }

    /// Text shown in the config panel. Lists are rendered as JSON.
    pub fn display_text(&self) -> String {
        match self {
            ConfigValue::Bool(v) => v.to_string(),
            ConfigValue::Int(v) => v.to_string(),
            ConfigValue::Float(v) => v.to_string(),
            ConfigValue::String(v) => v.clone(),
            ConfigValue::List(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Parse edited text back into a value of the same kind as `self`.
    ///
    /// Returns `None` when the text does not parse as that kind, in which case
    /// the caller keeps the previous value.
    pub fn parse_like(&self, text: &str) -> Option<ConfigValue> {
        let text = text.trim();
        match self {
            ConfigValue::Bool(_) => text.parse::<bool>().ok().map(ConfigValue::Bool),
            ConfigValue::Int(_) => text
                .parse::<i64>()
                .map(ConfigValue::Int)
                .or_else(|_| text.parse::<f64>().map(ConfigValue::Float))
                .ok(),
            ConfigValue::Float(_) => text.parse::<f64>().ok().map(ConfigValue::Float),
            ConfigValue::String(_) => Some(ConfigValue::String(text.to_string())),
            ConfigValue::List(_) => match serde_json::from_str::<ConfigValue>(text) {
                Ok(list @ ConfigValue::List(_)) => Some(list),
                _ => None,
            },
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Int(value as i64)
    }
}

impl From<usize> for ConfigValue {
    fn from(value: usize) -> Self {
        ConfigValue::Int(value as i64)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

/// Ordered configuration map of a block instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockConfig(BTreeMap<String, ConfigValue>);

impl BlockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(ConfigValue::as_usize)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ConfigValue::as_float)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ConfigValue::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// A list of strings. Non-string entries make the whole value invalid.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key)?
            .as_list()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ConfigValue)> for BlockConfig {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
