//! Conda detector (Python data-science environments)

use super::{Detector, DetectorEnvironment, DetectorResult, DetectorType, Extraction, ExtractionContext};
use crate::exec::CommandRunner;
use crate::graph::{CodeLocation, Dependency, DependencyGraph, ExternalId, ANACONDA};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use tracing::debug;

const ENVIRONMENT_YML: &str = "environment.yml";

#[derive(Debug, Deserialize)]
struct EnvironmentYml {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CondaListEntry {
    name: String,
    version: String,
    #[serde(default)]
    platform: Option<String>,
}

/// Lists the active environment's installed packages via `conda list`.
pub struct CondaDetector {
    runner: Arc<dyn CommandRunner>,
}

impl CondaDetector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Detector for CondaDetector {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Conda
    }

    fn name(&self) -> &'static str {
        "conda environment"
    }

    fn applicable(&self, env: &DetectorEnvironment) -> DetectorResult {
        if env.has_file(ENVIRONMENT_YML) {
            DetectorResult::Passed
        } else {
            DetectorResult::file_not_found(ENVIRONMENT_YML)
        }
    }

    fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
        if self.runner.executable_exists("conda", "--version") {
            DetectorResult::Passed
        } else {
            DetectorResult::executable_not_found("conda")
        }
    }

    fn extract(&self, env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
        match self.try_extract(env) {
            Ok(extraction) => extraction,
            Err(error) => Extraction::exception(error),
        }
    }
}

impl CondaDetector {
    fn try_extract(&self, env: &DetectorEnvironment) -> Result<Extraction> {
        let output = self
            .runner
            .run("conda", &["list", "--json"], &env.directory)
            .context("failed to run conda list")?;

        if !output.succeeded() {
            return Ok(Extraction::failure(format!(
                "conda list exited with {:?}",
                output.exit_code
            )));
        }

        let dependencies = parse_conda_list(&output.stdout)?;
        debug!(
            dir = %env.directory.display(),
            dependencies = dependencies.len(),
            "Parsed conda package list"
        );

        let environment_name = read_environment_name(env);
        let external_id = ExternalId::name_version(
            ANACONDA,
            environment_name.clone().unwrap_or_else(|| "conda-env".to_string()),
            "current",
        );

        let location = CodeLocation::new(
            env.directory.clone(),
            DetectorType::Conda,
            external_id,
            DependencyGraph::new(dependencies),
        );
        Ok(Extraction::success_with_project(
            vec![location],
            environment_name,
            None,
        ))
    }
}

fn read_environment_name(env: &DetectorEnvironment) -> Option<String> {
    let content = fs::read_to_string(env.file(ENVIRONMENT_YML)).ok()?;
    let parsed: EnvironmentYml = serde_yaml::from_str(&content).ok()?;
    parsed.name.filter(|n| !n.trim().is_empty())
}

fn parse_conda_list(stdout: &str) -> Result<Vec<Dependency>> {
    let entries: Vec<CondaListEntry> =
        serde_json::from_str(stdout).context("failed to parse conda list output")?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let external_id = match &entry.platform {
                Some(platform) if !platform.is_empty() => ExternalId::architecture(
                    ANACONDA,
                    entry.name.clone(),
                    entry.version.clone(),
                    platform.clone(),
                ),
                _ => ExternalId::name_version(ANACONDA, entry.name.clone(), entry.version.clone()),
            };
            Dependency::new(entry.name, entry.version, external_id)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecError, ExecutableOutput};
    use std::path::Path;
    use tempfile::TempDir;

    struct CannedRunner {
        stdout: String,
    }

    impl CommandRunner for CannedRunner {
        fn run(
            &self,
            _exe: &str,
            _args: &[&str],
            _cwd: &Path,
        ) -> Result<ExecutableOutput, ExecError> {
            Ok(ExecutableOutput {
                exit_code: Some(0),
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    const LIST_JSON: &str = r#"[
        {"name": "numpy", "version": "1.24.3", "platform": "linux-64"},
        {"name": "python", "version": "3.11.4", "platform": "linux-64"},
        {"name": "pip-only-pkg", "version": "0.1.0"}
    ]"#;

    #[test]
    fn test_parse_conda_list() {
        let deps = parse_conda_list(LIST_JSON).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].external_id.bom_ref(), "anaconda:numpy/1.24.3/linux-64");
        assert_eq!(deps[2].external_id.architecture, None);
    }

    #[test]
    fn test_parse_bad_json_fails() {
        assert!(parse_conda_list("not json").is_err());
    }

    #[test]
    fn test_extract_reads_environment_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("environment.yml"),
            "name: science\ndependencies:\n  - numpy\n",
        )
        .unwrap();

        let env = DetectorEnvironment::new(dir.path().to_path_buf(), 0);
        let detector = CondaDetector::new(Arc::new(CannedRunner {
            stdout: LIST_JSON.to_string(),
        }));
        assert!(detector.applicable(&env).passed());

        let extraction = detector.extract(
            &env,
            &ExtractionContext::new(crate::detector::ExtractionId(1), Path::new("/tmp")),
        );
        let Extraction::Success {
            project_name,
            code_locations,
            ..
        } = extraction
        else {
            panic!("expected success");
        };
        assert_eq!(project_name.as_deref(), Some("science"));
        assert_eq!(code_locations[0].graph.len(), 3);
    }
}
