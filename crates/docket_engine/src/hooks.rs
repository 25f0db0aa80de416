use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use docket_base::DocketResult;

use crate::config::OpenApiConfig;
use crate::index::FilteredIndex;
use crate::model::DocumentModel;

/* 📖 # Which hooks can a unit contribute?

Three collaborators contribute to a document besides the static file:

- an `AnnotationScanner` turns the filtered type index into a partial model,
- a `ModelReader` lets application code build a model programmatically,
- a `ModelFilter` transforms the merged model as a whole.

Readers and filters are named in configuration (`mp.openapi.model.reader`,
`mp.openapi.filter`) and resolved through the unit's `HookLoader`, the same way a
class name would be resolved through a class loader. Plain closures work as hooks.
*/

/// Derives a partial model from the annotated types of a unit.
pub trait AnnotationScanner: Send + Sync {
    fn scan(
        &self,
        config: &OpenApiConfig,
        index: FilteredIndex<'_>,
    ) -> DocketResult<Option<DocumentModel>>;
}

/// Application code building a model programmatically.
pub trait ModelReader: Send + Sync {
    fn read(&self, config: &OpenApiConfig) -> DocketResult<DocumentModel>;
}

/// Full-document transform applied after merging.
pub trait ModelFilter: Send + Sync {
    fn filter(&self, model: DocumentModel) -> DocketResult<DocumentModel>;
}

impl<F> ModelReader for F
where
    F: Fn(&OpenApiConfig) -> DocketResult<DocumentModel> + Send + Sync,
{
    fn read(&self, config: &OpenApiConfig) -> DocketResult<DocumentModel> {
        self(config)
    }
}

impl<F> ModelFilter for F
where
    F: Fn(DocumentModel) -> DocketResult<DocumentModel> + Send + Sync,
{
    fn filter(&self, model: DocumentModel) -> DocketResult<DocumentModel> {
        self(model)
    }
}

/// Resolves reader and filter hooks of one unit by name.
#[derive(Clone, Default)]
pub struct HookLoader {
    readers: HashMap<String, Arc<dyn ModelReader>>,
    filters: HashMap<String, Arc<dyn ModelFilter>>,
}

impl HookLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(mut self, name: impl Into<String>, reader: impl ModelReader + 'static) -> Self {
        self.readers.insert(name.into(), Arc::new(reader));
        self
    }

    pub fn with_filter(mut self, name: impl Into<String>, filter: impl ModelFilter + 'static) -> Self {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    pub fn reader(&self, name: &str) -> Option<Arc<dyn ModelReader>> {
        self.readers.get(name).cloned()
    }

    pub fn filter(&self, name: &str) -> Option<Arc<dyn ModelFilter>> {
        self.filters.get(name).cloned()
    }
}

impl fmt::Debug for HookLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut readers: Vec<_> = self.readers.keys().collect();
        let mut filters: Vec<_> = self.filters.keys().collect();
        readers.sort();
        filters.sort();
        f.debug_struct("HookLoader")
            .field("readers", &readers)
            .field("filters", &filters)
            .finish()
    }
}

/// Default scanner: deep-merges the fragments the indexer attached to each
/// accepted type, in index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentScanner;

impl AnnotationScanner for FragmentScanner {
    fn scan(
        &self,
        _config: &OpenApiConfig,
        index: FilteredIndex<'_>,
    ) -> DocketResult<Option<DocumentModel>> {
        let mut merged: Option<DocumentModel> = None;
        for indexed in index.types() {
            let Some(fragment) = &indexed.fragment else {
                continue;
            };
            debug!(type_name = %indexed.name, "merging annotation fragment");
            merged
                .get_or_insert_with(DocumentModel::new)
                .merge(fragment.clone());
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MapConfig, SCAN_EXCLUDE_PACKAGES};
    use crate::index::{IndexedType, TypeIndex};
    use docket_base::err;
    use serde_json::json;

    fn fragment(value: serde_json::Value) -> DocumentModel {
        DocumentModel::from_value(value).unwrap()
    }

    fn index() -> TypeIndex {
        TypeIndex::new(vec![
            IndexedType::new("com.acme.orders.OrderResource")
                .with_fragment(fragment(json!({"paths": {"/orders": {"get": {}}}}))),
            IndexedType::new("com.acme.orders.Order"),
            IndexedType::new("com.acme.internal.HealthResource")
                .with_fragment(fragment(json!({"paths": {"/health": {"get": {}}}}))),
        ])
    }

    #[test]
    fn test_fragment_scanner_merges_accepted_types() {
        let index = index();
        let config = OpenApiConfig::default();
        let scanned = FragmentScanner
            .scan(&config, FilteredIndex::new(&index, &config))
            .unwrap()
            .unwrap();

        assert_eq!(
            scanned.into_value(),
            json!({"paths": {"/orders": {"get": {}}, "/health": {"get": {}}}})
        );
    }

    #[test]
    fn test_fragment_scanner_respects_filter() {
        let index = index();
        let config = OpenApiConfig::from_source(
            &MapConfig::new().with(SCAN_EXCLUDE_PACKAGES, "com.acme.internal"),
        );
        let scanned = FragmentScanner
            .scan(&config, FilteredIndex::new(&index, &config))
            .unwrap()
            .unwrap();

        assert_eq!(scanned.pointer("/paths/~1health"), None);
        assert!(scanned.pointer("/paths/~1orders").is_some());
    }

    #[test]
    fn test_fragment_scanner_without_fragments() {
        let index = TypeIndex::new(vec![IndexedType::new("com.acme.Plain")]);
        let config = OpenApiConfig::default();
        let scanned = FragmentScanner
            .scan(&config, FilteredIndex::new(&index, &config))
            .unwrap();
        assert_eq!(scanned, None);
    }

    #[test]
    fn test_hook_loader_resolves_by_name() {
        let loader = HookLoader::new()
            .with_reader(
                "com.acme.Reader",
                |_: &OpenApiConfig| -> DocketResult<DocumentModel> {
                    Ok(fragment(json!({"info": {"title": "Orders"}})))
                },
            )
            .with_filter("com.acme.Failing", |_: DocumentModel| -> DocketResult<DocumentModel> {
                Err(err!("rejected"))
            });

        let reader = loader.reader("com.acme.Reader").unwrap();
        assert_eq!(
            reader.read(&OpenApiConfig::default()).unwrap().pointer("/info/title"),
            Some(&json!("Orders"))
        );
        assert!(loader.reader("com.acme.Other").is_none());
        assert!(loader.filter("com.acme.Reader").is_none());
        assert!(loader.filter("com.acme.Failing").unwrap().filter(DocumentModel::new()).is_err());
    }

    #[test]
    fn test_hook_loader_debug_lists_names() {
        let loader = HookLoader::new()
            .with_reader("b.Reader", |_: &OpenApiConfig| -> DocketResult<DocumentModel> { Ok(DocumentModel::new()) })
            .with_reader("a.Reader", |_: &OpenApiConfig| -> DocketResult<DocumentModel> { Ok(DocumentModel::new()) });
        assert_eq!(
            format!("{:?}", loader),
            r#"HookLoader { readers: ["a.Reader", "b.Reader"], filters: [] }"#
        );
    }
}
