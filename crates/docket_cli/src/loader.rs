use std::path::Path;

use tracing::debug;

use docket_base::{DocketResult, PalHandle, RealPal, ResultExt};
use docket_engine::{DeployableUnit, DeploymentRoot, MapConfig, TypeIndex, locate};

/// Where a unit keeps its MicroProfile configuration, in lookup order.
const CONFIG_CANDIDATES: [&str; 2] = [
    "META-INF/microprofile-config.properties",
    "WEB-INF/classes/META-INF/microprofile-config.properties",
];

/// Annotation index written by the build.
const TYPE_INDEX: &str = "META-INF/type-index.json";

/// Turns an exploded unit directory into a `DeployableUnit`.
///
/// A unit counts as having OpenAPI relevant metadata when it ships either a type
/// index or a static description.
pub fn load_unit(dir: &Path) -> DocketResult<DeployableUnit> {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());
    let root = DeploymentRoot::new(PalHandle::new(RealPal::new(dir.to_path_buf())));

    let mut config = MapConfig::new();
    for resource in CONFIG_CANDIDATES {
        if root.exists(resource)? {
            let text = root
                .read_to_string(resource)
                .with_context(|| format!("Failed to read {} of {}", resource, name))?;
            config = MapConfig::from_properties(&text)
                .with_context(|| format!("Invalid {} in {}", resource, name))?;
            debug!(unit = %name, resource, "loaded configuration");
            break;
        }
    }

    let index = if root.exists(TYPE_INDEX)? {
        let text = root.read_to_string(TYPE_INDEX)?;
        Some(
            TypeIndex::from_json(&text)
                .with_context(|| format!("Invalid {} in {}", TYPE_INDEX, name))?,
        )
    } else {
        None
    };
    let has_static_file = locate(&root)?.is_some();
    let has_relevant_metadata = index.is_some() || has_static_file;

    let mut unit = DeployableUnit::new(name, root)
        .with_config(config)
        .with_relevant_metadata(has_relevant_metadata);
    if let Some(index) = index {
        unit = unit.with_index(index);
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_engine::config::{ENABLED, PATH};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, resource: &str, content: &str) {
        let full = dir.join(resource);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn unit_dir() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("orders.war");
        fs::create_dir_all(&dir).unwrap();
        (temp_dir, dir)
    }

    #[test]
    fn test_plain_directory_has_no_metadata() {
        let (_temp_dir, dir) = unit_dir();
        let unit = load_unit(&dir).unwrap();

        assert_eq!(unit.name, "orders.war");
        assert!(!unit.has_relevant_metadata);
        assert!(unit.index.is_none());
    }

    #[test]
    fn test_static_file_counts_as_metadata() {
        let (_temp_dir, dir) = unit_dir();
        write(&dir, "WEB-INF/classes/META-INF/openapi.yml", "openapi: 3.0.3\n");

        assert!(load_unit(&dir).unwrap().has_relevant_metadata);
    }

    #[test]
    fn test_config_and_index_are_loaded() {
        let (_temp_dir, dir) = unit_dir();
        write(
            &dir,
            "WEB-INF/classes/META-INF/microprofile-config.properties",
            "mp.openapi.extensions.path=/api-doc\nmp.openapi.extensions.enabled=false\n",
        );
        write(
            &dir,
            "META-INF/type-index.json",
            r#"[{"name": "com.acme.OrderResource", "fragment": {"paths": {"/orders": {}}}}]"#,
        );

        let unit = load_unit(&dir).unwrap();
        assert!(unit.has_relevant_metadata);
        assert_eq!(unit.index.as_ref().map(TypeIndex::len), Some(1));
        assert_eq!(unit.config.get(PATH).as_deref(), Some("/api-doc"));
        assert_eq!(unit.config.get(ENABLED).as_deref(), Some("false"));
    }

    #[test]
    fn test_invalid_index_is_reported() {
        let (_temp_dir, dir) = unit_dir();
        write(&dir, "META-INF/type-index.json", "not json");

        let err = load_unit(&dir).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Invalid META-INF/type-index.json in orders.war: Failed to parse type index")
        );
    }

    #[test]
    fn test_properties_syntax_is_honored() {
        let (_temp_dir, dir) = unit_dir();
        write(
            &dir,
            "META-INF/microprofile-config.properties",
            "mp.openapi.extensions.enabled false\nmp.openapi.servers=https\\://api.example.com\n",
        );

        let unit = load_unit(&dir).unwrap();
        assert_eq!(unit.config.get(ENABLED).as_deref(), Some("false"));
        assert_eq!(
            unit.config.get("mp.openapi.servers").as_deref(),
            Some("https://api.example.com")
        );
    }
}
