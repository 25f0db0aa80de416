use tracing::debug;

use docket_base::DocketResult;

use crate::model::Format;
use crate::unit::DeploymentRoot;

/* 📖 # Where is the static API description looked up?

A unit may ship a hand-written description as a resource. Candidates are probed in
a fixed order, YAML before JSON, and within each format the top-level `META-INF`
before the one under `WEB-INF/classes`. The first existing resource wins; later
candidates are never opened.
*/

const YAML_CANDIDATES: [&str; 4] = [
    "META-INF/openapi.yaml",
    "WEB-INF/classes/META-INF/openapi.yaml",
    "META-INF/openapi.yml",
    "WEB-INF/classes/META-INF/openapi.yml",
];

const JSON_CANDIDATES: [&str; 2] = [
    "META-INF/openapi.json",
    "WEB-INF/classes/META-INF/openapi.json",
];

/// The static description resource chosen for a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    /// Resource path relative to the unit root.
    pub resource: &'static str,
    pub format: Format,
}

fn candidates() -> impl Iterator<Item = (&'static str, Format)> {
    YAML_CANDIDATES
        .into_iter()
        .map(|resource| (resource, Format::Yaml))
        .chain(JSON_CANDIDATES.into_iter().map(|resource| (resource, Format::Json)))
}

/// Returns the first existing static description in the unit, if any.
pub fn locate(root: &DeploymentRoot) -> DocketResult<Option<StaticFile>> {
    for (resource, format) in candidates() {
        if root.exists(resource)? {
            debug!(resource, %format, "found static API description");
            return Ok(Some(StaticFile { resource, format }));
        }
    }
    Ok(None)
}
