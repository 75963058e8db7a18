//! Gradle detector (JVM)

use super::{Detector, DetectorEnvironment, DetectorResult, DetectorType, Extraction, ExtractionContext};
use crate::exec::CommandRunner;
use crate::graph::{CodeLocation, Dependency, DependencyGraph, ExternalId, MAVEN};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

const BUILD_GRADLE: &str = "build.gradle";
const BUILD_GRADLE_KTS: &str = "build.gradle.kts";

/// Runs `gradle dependencies` and parses the resolved coordinates out of
/// the report tree.
pub struct GradleDetector {
    runner: Arc<dyn CommandRunner>,
}

impl GradleDetector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Detector for GradleDetector {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Gradle
    }

    fn name(&self) -> &'static str {
        "gradle dependencies report"
    }

    fn applicable(&self, env: &DetectorEnvironment) -> DetectorResult {
        if env.has_file(BUILD_GRADLE) || env.has_file(BUILD_GRADLE_KTS) {
            DetectorResult::Passed
        } else {
            DetectorResult::file_not_found(BUILD_GRADLE)
        }
    }

    fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
        if self.runner.executable_exists("gradle", "--version") {
            DetectorResult::Passed
        } else {
            DetectorResult::executable_not_found("gradle")
        }
    }

    fn extract(&self, env: &DetectorEnvironment, _ctx: &ExtractionContext) -> Extraction {
        match self.try_extract(env) {
            Ok(extraction) => extraction,
            Err(error) => Extraction::exception(error),
        }
    }
}

impl GradleDetector {
    fn try_extract(&self, env: &DetectorEnvironment) -> Result<Extraction> {
        let output = self
            .runner
            .run("gradle", &["dependencies", "-q"], &env.directory)
            .context("failed to run gradle dependencies")?;

        if !output.succeeded() {
            return Ok(Extraction::failure(format!(
                "gradle dependencies exited with {:?}",
                output.exit_code
            )));
        }

        let dependencies = parse_dependency_report(&output.stdout)?;
        debug!(
            dir = %env.directory.display(),
            dependencies = dependencies.len(),
            "Parsed gradle dependency report"
        );

        let dir_name = env
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "gradle-project".to_string());
        let external_id = ExternalId::name_version(MAVEN, dir_name, "unspecified");

        let location = CodeLocation::new(
            env.directory.clone(),
            DetectorType::Gradle,
            external_id,
            DependencyGraph::new(dependencies),
        );
        Ok(Extraction::success(vec![location]))
    }
}

/// Pulls `group:artifact:version` coordinates out of report tree lines like
/// `+--- org.slf4j:slf4j-api:1.7.36` or `\--- com.google.guava:guava:31.1-jre (*)`.
fn parse_dependency_report(report: &str) -> Result<Vec<Dependency>> {
    let line_re = Regex::new(r"[+\\]--- ([^\s:]+):([^\s:]+):([^\s:(]+)")
        .map_err(|e| anyhow!("invalid report pattern: {e}"))?;

    let mut dependencies = Vec::new();
    for caps in report.lines().filter_map(|line| line_re.captures(line)) {
        let group = &caps[1];
        let artifact = &caps[2];
        let version = &caps[3];
        let name = format!("{group}:{artifact}");
        dependencies.push(Dependency::new(
            name.clone(),
            version,
            ExternalId::name_version(MAVEN, name, version),
        ));
    }
    Ok(dependencies)
}
