/* 📖 # How does a deployment end up with an OpenAPI endpoint?

`DeploymentGate::on_deploy` decides whether a unit publishes a document at all,
`DocumentAssembler` builds it from the static file, the annotation scan and the
reader hook, and `EndpointRegistry` lets exactly one unit claim each
(server, host, path) slot. Everything the host owns (configuration, file tree,
type index, hooks, host binding) reaches the engine through the types in `unit`,
`config`, `index` and `hooks`.
*/

pub mod assembler;
pub mod config;
pub mod gate;
pub mod handler;
pub mod hooks;
pub mod index;
pub mod locator;
pub mod model;
pub mod registry;
pub mod router;
pub mod unit;

pub use assembler::{DocumentAssembler, ModelSource, merge_sources};
pub use config::{ConfigSource, MapConfig, OpenApiConfig};
pub use gate::{DeploymentGate, DeploymentOutcome, DeploymentReport, Diagnostic};
pub use handler::OpenApiHttpHandler;
pub use hooks::{AnnotationScanner, FragmentScanner, HookLoader, ModelFilter, ModelReader};
pub use index::{FilteredIndex, IndexedType, TypeIndex};
pub use locator::{StaticFile, locate};
pub use model::{DocumentModel, Format};
pub use registry::{EndpointBinding, EndpointRegistry, Registration, RegistrationKey};
pub use router::HostRouter;
pub use unit::{DeployableUnit, DeploymentRoot, FixedHostBinding, HostBinding, HostBindingResolver};
