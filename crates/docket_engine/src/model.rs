use std::error::Error as StdError;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use docket_base::{DocketResult, err};

/* 📖 # What is a DocumentModel?

An OpenAPI description held as a JSON object tree. The engine never interprets
OpenAPI semantics; it only needs to decode a model, deep-merge models and encode
the result. Top-level keys (`openapi`, `info`, `paths`, `components`, ...) are
called sections.

Keys keep the order they were declared in. A merge keeps the order of the base
model and appends keys that only the overlay has.
*/

/// Serialization format of an API description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Parses a format name as used in `?format=` queries.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Yaml => "application/yaml;charset=utf-8",
            Self::Json => "application/json;charset=utf-8",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// In-memory API description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentModel(Map<String, Value>);

impl DocumentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value; only objects (and `null`, as an empty model) qualify.
    pub fn from_value(value: Value) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        match value {
            Value::Object(sections) => Ok(Self(sections)),
            Value::Null => Ok(Self::new()),
            other => Err(format!(
                "expected a mapping at the top level, found {}",
                kind_of(&other)
            )
            .into()),
        }
    }

    /// Decodes a static description file.
    pub fn decode(
        reader: impl Read,
        format: Format,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let value: Value = match format {
            Format::Yaml => serde_yaml::from_reader(reader)?,
            Format::Json => serde_json::from_reader(reader)?,
        };
        Self::from_value(value)
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn set_section(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// Looks up a nested value by JSON pointer, e.g. `/paths/~1orders/get`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (first, tail) = rest
            .split_once('/')
            .map_or((rest, None), |(first, tail)| (first, Some(tail)));
        let section = self.0.get(&first.replace("~1", "/").replace("~0", "~"))?;
        match tail {
            Some(tail) => section.pointer(&format!("/{}", tail)),
            None => Some(section),
        }
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deep-merges `overlay` into this model. Objects merge key by key; on any
    /// other collision the overlay value replaces the existing one.
    pub fn merge(&mut self, overlay: DocumentModel) {
        for (name, value) in overlay.0 {
            match self.0.get_mut(&name) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.0.insert(name, value);
                }
            }
        }
    }

    pub fn to_json(&self) -> DocketResult<String> {
        serde_json::to_string_pretty(&self.0)
            .map_err(|e| err!("Failed to serialize document as JSON: {}", e))
    }

    pub fn to_yaml(&self) -> DocketResult<String> {
        serde_yaml::to_string(&self.0)
            .map_err(|e| err!("Failed to serialize document as YAML: {}", e))
    }

    pub fn serialize(&self, format: Format) -> DocketResult<String> {
        match format {
            Format::Yaml => self.to_yaml(),
            Format::Json => self.to_json(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn deep_merge(target: &mut Value, overlay: Value) {
    match overlay {
        Value::Object(overlay_map) if target.is_object() => {
            if let Value::Object(target_map) = target {
                for (key, value) in overlay_map {
                    match target_map.get_mut(&key) {
                        Some(existing) => deep_merge(existing, value),
                        None => {
                            target_map.insert(key, value);
                        }
                    }
                }
            }
        }
        overlay => *target = overlay,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
