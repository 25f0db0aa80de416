use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, instrument};

use docket_base::{DocketError, DocketResult, ErrorKind};

use crate::config::OpenApiConfig;
use crate::hooks::{AnnotationScanner, HookLoader, ModelFilter};
use crate::index::{FilteredIndex, TypeIndex};
use crate::locator::{StaticFile, locate};
use crate::model::DocumentModel;
use crate::unit::DeploymentRoot;

/* 📖 # How is a unit's document assembled?

Up to three partial models are collected, each tagged with its `ModelSource`:

1. the static description file, if the unit ships one,
2. the annotation model from scanning the filtered type index,
3. the reader model from the configured reader hook.

The tagged models are sorted by source and folded left to right with a deep merge,
so a later source wins every collision: reader over annotations over static file.
`mp.openapi.servers` then replaces the `servers` section, and the configured filter
hook gets the last word on the whole document.

Assembly either yields a finished document or fails the deployment; nothing is
registered in between.
*/

/// Provenance of a partial model. The declaration order is the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelSource {
    StaticFile,
    Annotations,
    Reader,
}

/// Deep-merges the given partial models, lowest precedence first.
pub fn merge_sources(mut sources: Vec<(ModelSource, DocumentModel)>) -> DocumentModel {
    sources.sort_by_key(|(source, _)| *source);
    sources
        .into_iter()
        .fold(DocumentModel::new(), |mut merged, (source, model)| {
            debug!(?source, sections = model.len(), "merging partial model");
            merged.merge(model);
            merged
        })
}

/// Builds the final document of one unit.
#[derive(Clone)]
pub struct DocumentAssembler {
    scanner: Arc<dyn AnnotationScanner>,
}

impl fmt::Debug for DocumentAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentAssembler").finish_non_exhaustive()
    }
}

impl DocumentAssembler {
    pub fn new(scanner: impl AnnotationScanner + 'static) -> Self {
        Self {
            scanner: Arc::new(scanner),
        }
    }

    #[instrument(skip_all, fields(unit = unit_name))]
    pub fn assemble(
        &self,
        unit_name: &str,
        config: &OpenApiConfig,
        root: &DeploymentRoot,
        index: Option<&TypeIndex>,
        hooks: &HookLoader,
    ) -> DocketResult<DocumentModel> {
        let mut sources = Vec::with_capacity(3);

        if let Some(static_file) = locate(root)? {
            let model = load_static_model(unit_name, root, &static_file)?;
            sources.push((ModelSource::StaticFile, model));
        }

        if config.scan_disabled {
            debug!("annotation scanning disabled");
        } else {
            let empty = TypeIndex::default();
            let filtered = FilteredIndex::new(index.unwrap_or(&empty), config);
            if let Some(model) = self.scanner.scan(config, filtered)? {
                sources.push((ModelSource::Annotations, model));
            }
        }

        if let Some(model) = invoke_reader_hook(unit_name, config, hooks)? {
            sources.push((ModelSource::Reader, model));
        }

        let mut document = merge_sources(sources);
        apply_servers(&mut document, &config.servers);

        match resolve_filter_hook(unit_name, config, hooks)? {
            Some((name, filter)) => filter
                .filter(document)
                .map_err(|e| hook_failed(unit_name, name, e)),
            None => Ok(document),
        }
    }
}

fn load_static_model(
    unit_name: &str,
    root: &DeploymentRoot,
    static_file: &StaticFile,
) -> DocketResult<DocumentModel> {
    let reader = root
        .open(static_file.resource)
        .map_err(|e| static_file_error(unit_name, static_file, e))?;
    let model = DocumentModel::decode(reader, static_file.format)
        .map_err(|e| static_file_error(unit_name, static_file, e))?;
    debug!(resource = static_file.resource, sections = model.len(), "decoded static file");
    Ok(model)
}

fn static_file_error(
    unit_name: &str,
    static_file: &StaticFile,
    source: Box<dyn StdError + Send + Sync>,
) -> Box<DocketError> {
    Box::new(DocketError::new(ErrorKind::StaticFileDecode {
        unit: unit_name.to_string(),
        path: static_file.resource.to_string(),
        source,
    }))
}

fn invoke_reader_hook(
    unit_name: &str,
    config: &OpenApiConfig,
    hooks: &HookLoader,
) -> DocketResult<Option<DocumentModel>> {
    let Some(name) = &config.model_reader else {
        return Ok(None);
    };
    let reader = hooks
        .reader(name)
        .ok_or_else(|| hook_not_found(unit_name, name))?;
    let model = reader
        .read(config)
        .map_err(|e| hook_failed(unit_name, name, e))?;
    debug!(hook = %name, "reader hook built a model");
    Ok(Some(model))
}

fn resolve_filter_hook<'a>(
    unit_name: &str,
    config: &'a OpenApiConfig,
    hooks: &HookLoader,
) -> DocketResult<Option<(&'a str, Arc<dyn ModelFilter>)>> {
    let Some(name) = &config.filter else {
        return Ok(None);
    };
    let filter = hooks
        .filter(name)
        .ok_or_else(|| hook_not_found(unit_name, name))?;
    Ok(Some((name.as_str(), filter)))
}

fn apply_servers(document: &mut DocumentModel, servers: &[String]) {
    if servers.is_empty() {
        return;
    }
    let servers: Vec<Value> = servers.iter().map(|url| json!({ "url": url })).collect();
    document.set_section("servers", Value::Array(servers));
}

fn hook_not_found(unit_name: &str, hook: &str) -> Box<DocketError> {
    Box::new(DocketError::new(ErrorKind::HookNotFound {
        unit: unit_name.to_string(),
        hook: hook.to_string(),
    }))
}

fn hook_failed(unit_name: &str, hook: &str, cause: Box<DocketError>) -> Box<DocketError> {
    Box::new(
        DocketError::new(ErrorKind::HookFailed {
            unit: unit_name.to_string(),
            hook: hook.to_string(),
        })
        .caused_by(cause),
    )
}
