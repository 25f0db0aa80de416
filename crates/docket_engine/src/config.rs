use std::collections::HashMap;

use docket_base::{DocketResult, err};

/* 📖 # Where does configuration come from?

The host owns configuration sourcing; the engine only sees a key/value lookup
through `ConfigSource`. `OpenApiConfig` reads every key the engine understands in
one pass, so the rest of the pipeline works with typed values and defaults.
Blank values count as unset.
*/

pub const ENABLED: &str = "mp.openapi.extensions.enabled";
pub const PATH: &str = "mp.openapi.extensions.path";
pub const DEFAULT_PATH: &str = "/openapi";
pub const MODEL_READER: &str = "mp.openapi.model.reader";
pub const FILTER: &str = "mp.openapi.filter";
pub const SCAN_DISABLE: &str = "mp.openapi.scan.disable";
pub const SCAN_PACKAGES: &str = "mp.openapi.scan.packages";
pub const SCAN_CLASSES: &str = "mp.openapi.scan.classes";
pub const SCAN_EXCLUDE_PACKAGES: &str = "mp.openapi.scan.exclude.packages";
pub const SCAN_EXCLUDE_CLASSES: &str = "mp.openapi.scan.exclude.classes";
pub const SERVERS: &str = "mp.openapi.servers";

/// Black-box key/value store a deployable unit is configured from.
pub trait ConfigSource: std::fmt::Debug + Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// `ConfigSource` backed by a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Parses the text of a `.properties` file, as found in
    /// `META-INF/microprofile-config.properties`.
    pub fn from_properties(text: &str) -> DocketResult<Self> {
        let values = java_properties::read(text.as_bytes())
            .map_err(|e| err!("Failed to parse properties: {}", e))?;
        Ok(Self { values })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Typed view of the OpenAPI related configuration of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiConfig {
    pub enabled: bool,
    pub path: String,
    pub model_reader: Option<String>,
    pub filter: Option<String>,
    pub scan_disabled: bool,
    pub scan_packages: Vec<String>,
    pub scan_classes: Vec<String>,
    pub scan_exclude_packages: Vec<String>,
    pub scan_exclude_classes: Vec<String>,
    pub servers: Vec<String>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_PATH.to_string(),
            model_reader: None,
            filter: None,
            scan_disabled: false,
            scan_packages: vec![],
            scan_classes: vec![],
            scan_exclude_packages: vec![],
            scan_exclude_classes: vec![],
            servers: vec![],
        }
    }
}

impl OpenApiConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let lookup = |key: &str| {
            source
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let list = |key: &str| lookup(key).map(|value| parse_list(&value)).unwrap_or_default();
        let flag = |key: &str, default: bool| lookup(key).map_or(default, |value| parse_bool(&value));

        Self {
            enabled: flag(ENABLED, true),
            path: lookup(PATH).unwrap_or_else(|| DEFAULT_PATH.to_string()),
            model_reader: lookup(MODEL_READER),
            filter: lookup(FILTER),
            scan_disabled: flag(SCAN_DISABLE, false),
            scan_packages: list(SCAN_PACKAGES),
            scan_classes: list(SCAN_CLASSES),
            scan_exclude_packages: list(SCAN_EXCLUDE_PACKAGES),
            scan_exclude_classes: list(SCAN_EXCLUDE_CLASSES),
            servers: list(SERVERS),
        }
    }

    pub fn is_default_path(&self) -> bool {
        self.path == DEFAULT_PATH
    }
}

/// Boolean conversion as MicroProfile Config does it: a fixed set of truthy
/// spellings, everything else is false.
fn parse_bool(value: &str) -> bool {
    ["true", "1", "yes", "y", "on"]
        .iter()
        .any(|truthy| value.eq_ignore_ascii_case(truthy))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
