use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use docket_base::DocketResult;

use crate::assembler::DocumentAssembler;
use crate::config::{DEFAULT_PATH, OpenApiConfig};
use crate::handler::OpenApiHttpHandler;
use crate::registry::{EndpointRegistry, Registration, RegistrationKey};
use crate::unit::{DeployableUnit, HostBindingResolver};

/* 📖 # What happens when a unit deploys?

`DeploymentGate::on_deploy` walks a unit through a fixed sequence and stops at the
first terminal state:

1. no OpenAPI relevant metadata: `Skipped`, without touching the unit's files,
2. `mp.openapi.extensions.enabled=false`: `Disabled`,
3. a path other than `/openapi` is reported but honored,
4. the host binding and the path make up the registration key,
5. the document is assembled; a failure here is the `Err` of `on_deploy` and the
   unit fails to deploy,
6. the key is claimed: `Registered`, or `RegistrationLost` when another unit got
   there first. Losing is not an error.

Operator notices are both logged and returned in the `DeploymentReport`.
*/

/// Operator-facing notice produced while deploying a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Disabled {
        unit: String,
    },
    NonStandardPath {
        unit: String,
        path: String,
        default: String,
    },
    EndpointAlreadyRegistered {
        unit: String,
        host: String,
        path: String,
        owner: String,
    },
}

impl Diagnostic {
    fn emit(&self) {
        match self {
            Diagnostic::NonStandardPath { unit, path, .. } => {
                warn!(unit = %unit, path = %path, "{}", self)
            }
            Diagnostic::Disabled { unit } => info!(unit = %unit, "{}", self),
            Diagnostic::EndpointAlreadyRegistered { unit, host, .. } => {
                info!(unit = %unit, host = %host, "{}", self)
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Disabled { unit } => {
                write!(f, "OpenAPI endpoint is disabled for deployment {}", unit)
            }
            Diagnostic::NonStandardPath {
                unit,
                path,
                default,
            } => write!(
                f,
                "Deployment {} uses the non-standard OpenAPI endpoint path {} instead of {}",
                unit, path, default
            ),
            Diagnostic::EndpointAlreadyRegistered {
                unit,
                host,
                path,
                owner,
            } => write!(
                f,
                "OpenAPI endpoint {} on host {} is already registered by {}, skipping deployment {}",
                path, host, owner, unit
            ),
        }
    }
}

/// Terminal state of a deployment that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    /// The unit has no OpenAPI relevant metadata.
    Skipped,
    Disabled,
    /// Another unit owns the key; this unit serves no endpoint.
    RegistrationLost { key: RegistrationKey, owner: String },
    Registered { key: RegistrationKey },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    pub unit: String,
    pub outcome: DeploymentOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

impl DeploymentReport {
    fn new(unit: &DeployableUnit) -> Self {
        Self {
            unit: unit.name.clone(),
            outcome: DeploymentOutcome::Skipped,
            diagnostics: vec![],
        }
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    fn finish(mut self, outcome: DeploymentOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Entry point the host calls for every unit it deploys or undeploys.
#[derive(Debug, Clone)]
pub struct DeploymentGate {
    registry: EndpointRegistry,
    host_resolver: Arc<dyn HostBindingResolver>,
    assembler: DocumentAssembler,
}

impl DeploymentGate {
    pub fn new(
        registry: EndpointRegistry,
        host_resolver: impl HostBindingResolver + 'static,
        assembler: DocumentAssembler,
    ) -> Self {
        Self {
            registry,
            host_resolver: Arc::new(host_resolver),
            assembler,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    #[instrument(skip_all, fields(unit = %unit.name))]
    pub fn on_deploy(&self, unit: &DeployableUnit) -> DocketResult<DeploymentReport> {
        let report = DeploymentReport::new(unit);
        if !unit.has_relevant_metadata {
            debug!("no OpenAPI relevant metadata");
            return Ok(report.finish(DeploymentOutcome::Skipped));
        }
        self.deploy(unit, report)
    }

    fn deploy(
        &self,
        unit: &DeployableUnit,
        mut report: DeploymentReport,
    ) -> DocketResult<DeploymentReport> {
        let config = OpenApiConfig::from_source(unit.config.as_ref());
        if !config.enabled {
            report.record(Diagnostic::Disabled {
                unit: unit.name.clone(),
            });
            return Ok(report.finish(DeploymentOutcome::Disabled));
        }
        if !config.is_default_path() {
            report.record(Diagnostic::NonStandardPath {
                unit: unit.name.clone(),
                path: config.path.clone(),
                default: DEFAULT_PATH.to_string(),
            });
        }

        let binding = self.host_resolver.resolve(unit);
        let key = RegistrationKey::new(&binding, config.path.as_str());

        let document = Arc::new(self.assembler.assemble(
            &unit.name,
            &config,
            &unit.root,
            unit.index.as_ref(),
            &unit.hooks,
        )?);
        let handler = Arc::new(OpenApiHttpHandler::new(document.clone()));

        let outcome = match self
            .registry
            .register(key.clone(), &unit.name, document, handler)
        {
            Registration::Registered => {
                info!(%key, "registered OpenAPI endpoint");
                DeploymentOutcome::Registered { key }
            }
            Registration::AlreadyTaken { owner } => {
                report.record(Diagnostic::EndpointAlreadyRegistered {
                    unit: unit.name.clone(),
                    host: binding.host,
                    path: key.path.clone(),
                    owner: owner.clone(),
                });
                DeploymentOutcome::RegistrationLost { key, owner }
            }
        };
        Ok(report.finish(outcome))
    }

    /// Releases the endpoints the unit owns so another unit may claim them.
    #[instrument(skip_all, fields(unit = %unit.name))]
    pub fn on_undeploy(&self, unit: &DeployableUnit) -> Vec<RegistrationKey> {
        let released = self.registry.release_owned_by(&unit.name);
        for key in &released {
            info!(%key, "unregistered OpenAPI endpoint");
        }
        released
    }
}
