use std::sync::Arc;

use docket_base::{DocketResult, FilePath, PalHandle, ReadSeek};

use crate::config::{ConfigSource, MapConfig};
use crate::hooks::HookLoader;
use crate::index::TypeIndex;

/// Root of a unit's resource tree, addressed through the PAL.
#[derive(Debug, Clone)]
pub struct DeploymentRoot {
    pal: PalHandle,
    base: FilePath,
}

impl DeploymentRoot {
    /// Root at the PAL's base directory.
    pub fn new(pal: PalHandle) -> Self {
        Self::at(pal, FilePath::from(""))
    }

    /// Root at a subdirectory of the PAL's base directory.
    pub fn at(pal: PalHandle, base: FilePath) -> Self {
        Self { pal, base }
    }

    /// Resolves a resource relative to this root.
    pub fn child(&self, resource: &str) -> FilePath {
        self.base.join(resource)
    }

    pub fn exists(&self, resource: &str) -> DocketResult<bool> {
        self.pal.file_exists(&self.child(resource))
    }

    pub fn open(&self, resource: &str) -> DocketResult<Box<dyn ReadSeek + 'static>> {
        self.pal.read_file(&self.child(resource))
    }

    pub fn read_to_string(&self, resource: &str) -> DocketResult<String> {
        self.pal.read_file_to_string(&self.child(resource))
    }
}

/// Server and virtual host a unit's web endpoints are bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostBinding {
    pub server: String,
    pub host: String,
}

impl HostBinding {
    pub fn new(server: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            host: host.into(),
        }
    }
}

impl Default for HostBinding {
    fn default() -> Self {
        Self::new("default-server", "default-host")
    }
}

/// Decides which server and host a unit is deployed to.
pub trait HostBindingResolver: std::fmt::Debug + Send + Sync {
    fn resolve(&self, unit: &DeployableUnit) -> HostBinding;
}

/// Binds every unit to the same server and host.
#[derive(Debug, Clone, Default)]
pub struct FixedHostBinding(pub HostBinding);

impl HostBindingResolver for FixedHostBinding {
    fn resolve(&self, _unit: &DeployableUnit) -> HostBinding {
        self.0.clone()
    }
}

/// A web application being deployed, with everything the host knows about it.
#[derive(Debug, Clone)]
pub struct DeployableUnit {
    pub name: String,
    pub root: DeploymentRoot,
    pub config: Arc<dyn ConfigSource>,
    pub index: Option<TypeIndex>,
    pub hooks: HookLoader,
    /// Whether the unit carries OpenAPI relevant metadata (annotations or
    /// descriptor files). Units without it are left alone.
    pub has_relevant_metadata: bool,
}

impl DeployableUnit {
    pub fn new(name: impl Into<String>, root: DeploymentRoot) -> Self {
        Self {
            name: name.into(),
            root,
            config: Arc::new(MapConfig::new()),
            index: None,
            hooks: HookLoader::new(),
            has_relevant_metadata: true,
        }
    }

    pub fn with_config(mut self, config: impl ConfigSource + 'static) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_index(mut self, index: TypeIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_hooks(mut self, hooks: HookLoader) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_relevant_metadata(mut self, relevant: bool) -> Self {
        self.has_relevant_metadata = relevant;
        self
    }
}
