use serde::Deserialize;

use docket_base::{DocketResult, err};

use crate::config::OpenApiConfig;
use crate::model::DocumentModel;

/* 📖 # What is the type index?

The host analyses a unit's compiled code and hands the engine a list of types
together with the OpenAPI fragment their annotations describe. The engine never
inspects code itself. `FilteredIndex` narrows the index down to what the
`mp.openapi.scan.*` keys allow before a scanner sees it.
*/

/// One annotated type of a unit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexedType {
    /// Fully qualified name, e.g. `com.acme.orders.OrderResource`.
    pub name: String,
    #[serde(default)]
    pub fragment: Option<DocumentModel>,
}

impl IndexedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragment: None,
        }
    }

    pub fn with_fragment(mut self, fragment: DocumentModel) -> Self {
        self.fragment = Some(fragment);
        self
    }

    /// Package part of the name; empty for types in the default package.
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(package, _)| package)
    }
}

/// All annotated types of a unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex(Vec<IndexedType>);

impl TypeIndex {
    pub fn new(types: Vec<IndexedType>) -> Self {
        Self(types)
    }

    pub fn from_json(text: &str) -> DocketResult<Self> {
        serde_json::from_str(text).map_err(|e| err!("Failed to parse type index: {}", e))
    }

    pub fn types(&self) -> &[IndexedType] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A type index seen through the unit's scan include/exclude settings.
#[derive(Debug, Clone, Copy)]
pub struct FilteredIndex<'a> {
    index: &'a TypeIndex,
    config: &'a OpenApiConfig,
}

impl<'a> FilteredIndex<'a> {
    pub fn new(index: &'a TypeIndex, config: &'a OpenApiConfig) -> Self {
        Self { index, config }
    }

    /// Exclusions win over inclusions; with no inclusions configured every
    /// type not excluded is accepted.
    pub fn accepts(&self, indexed: &IndexedType) -> bool {
        let package = indexed.package();
        let config = self.config;
        if config.scan_exclude_classes.iter().any(|class| *class == indexed.name)
            || config
                .scan_exclude_packages
                .iter()
                .any(|excluded| in_package(package, excluded))
        {
            return false;
        }
        if config.scan_classes.is_empty() && config.scan_packages.is_empty() {
            return true;
        }
        config.scan_classes.iter().any(|class| *class == indexed.name)
            || config
                .scan_packages
                .iter()
                .any(|included| in_package(package, included))
    }

    pub fn types(self) -> impl Iterator<Item = &'a IndexedType> {
        self.index
            .types()
            .iter()
            .filter(move |indexed| self.accepts(indexed))
    }
}

/// True if `package` is `parent` or one of its subpackages.
fn in_package(package: &str, parent: &str) -> bool {
    package == parent
        || package
            .strip_prefix(parent)
            .is_some_and(|rest| rest.starts_with('.'))
}
