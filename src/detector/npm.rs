//! npm detector (JavaScript/TypeScript)

use super::{Detector, DetectorEnvironment, DetectorResult, DetectorType, Extraction, ExtractionContext};
use crate::graph::{CodeLocation, Dependency, DependencyGraph, ExternalId, NPMJS};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

const PACKAGE_JSON: &str = "package.json";

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

/// Reads declared dependencies straight from the package manifest.
#[derive(Debug, Default)]
pub struct NpmDetector;

impl Detector for NpmDetector {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Npm
    }

    fn name(&self) -> &'static str {
        "npm package.json"
    }

    fn applicable(&self, env: &DetectorEnvironment) -> DetectorResult {
        if env.has_file(PACKAGE_JSON) {
            DetectorResult::Passed
        } else {
            DetectorResult::file_not_found(PACKAGE_JSON)
        }
    }

    fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
        DetectorResult::Passed
    }

    fn extract(&self, env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
        match self.try_extract(env) {
            Ok(extraction) => extraction,
            Err(error) => Extraction::exception(error),
        }
    }
}

impl NpmDetector {
    fn try_extract(&self, env: &DetectorEnvironment) -> Result<Extraction> {
        let manifest_path = env.file(PACKAGE_JSON);
        let content = fs::read_to_string(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: PackageJson = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        let dependencies: Vec<Dependency> = manifest
            .dependencies
            .iter()
            .chain(manifest.dev_dependencies.iter())
            .map(|(name, version)| {
                Dependency::new(
                    name.clone(),
                    version.clone(),
                    ExternalId::name_version(NPMJS, name.clone(), version.clone()),
                )
            })
            .collect();

        debug!(
            dir = %env.directory.display(),
            dependencies = dependencies.len(),
            "Parsed npm manifest"
        );

        let project_name = manifest.name.clone();
        let project_version = manifest.version.clone();
        let external_id = ExternalId::name_version(
            NPMJS,
            project_name.clone().unwrap_or_else(|| "unknown".to_string()),
            project_version.clone().unwrap_or_else(|| "0.0.0".to_string()),
        );

        let location = CodeLocation::new(
            env.directory.clone(),
            DetectorType::Npm,
            external_id,
            DependencyGraph::new(dependencies),
        );

        Ok(Extraction::success_with_project(
            vec![location],
            project_name,
            project_version,
        ))
    }
}
