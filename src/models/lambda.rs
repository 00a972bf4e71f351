// src/models/lambda.rs

//! Lambda configuration records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::ValueKind;

/// Ordered key/value configuration of a lambda.
///
/// Keys are unique and keep their insertion order. Number and boolean
/// values sent by the backend are kept in their string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ConfigMap {
    entries: Vec<(String, String)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value. Replacing keeps the key's position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Primitive type tag of a stored value.
    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.get(key).map(ValueKind::infer)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl TryFrom<Map<String, Value>> for ConfigMap {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(format!(
                        "config value for '{key}' must be a string, number or boolean, got {other}"
                    ));
                }
            };
            entries.push((key, value));
        }
        Ok(Self { entries })
    }
}

impl From<ConfigMap> for Map<String, Value> {
    fn from(map: ConfigMap) -> Self {
        map.entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect()
    }
}

fn default_active() -> bool {
    true
}

/// A client-configured serverless function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaConfig {
    /// Unique identifier
    pub lambda_name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub config: ConfigMap,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl LambdaConfig {
    /// Name shown to operators, falling back to the id.
    pub fn title(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.lambda_name
        } else {
            &self.display_name
        }
    }
}

/// Body of a configuration update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRequest<'a> {
    pub config: &'a ConfigMap,
}

/// Acknowledgement returned by some update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to a configuration update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateOutcome {
    Updated(LambdaConfig),
    Ack(UpdateAck),
}
