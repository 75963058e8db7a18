//! Source-tree walker
//!
//! Descends the tree up to the configured depth and asks every registered
//! detector whether it applies to each visited directory. Applicability
//! checks are pure filesystem predicates; nothing here runs external
//! processes or mutates state. Every (directory, detector) pair yields an
//! evaluation, including pairs that did not apply, so the search summary
//! can explain why.

use crate::config::ScoutConfig;
use crate::detector::{DetectorEnvironment, DetectorEvaluation, DetectorRegistry, DetectorResult};
use anyhow::{Context, Result};
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directories that never contain a project of their own.
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    "node_modules",
    "__pycache__",
    "venv",
    ".venv",
];

/// Walks `config.source_path` and produces one evaluation per
/// (directory, detector) pair, in stable (directory, detector) order.
pub fn search(config: &ScoutConfig, registry: &DetectorRegistry) -> Result<Vec<DetectorEvaluation>> {
    let root = config
        .source_path
        .canonicalize()
        .context("failed to canonicalize source path")?;

    info!(
        root = %root.display(),
        max_depth = config.max_depth,
        detectors = registry.len(),
        "Starting detector search"
    );

    let directories = walk_directories(&root, config.max_depth)?;
    debug!(directories = directories.len(), "Directory walk complete");

    let mut evaluations = Vec::new();
    for (directory, depth) in directories {
        let env = DetectorEnvironment::new(directory, depth);
        for detector in registry.detectors() {
            let searchable = if config
                .excluded_detector_types
                .contains(&detector.detector_type())
            {
                DetectorResult::Excluded {
                    reason: "excluded by configuration".to_string(),
                }
            } else {
                DetectorResult::Passed
            };

            let mut evaluation =
                DetectorEvaluation::new(detector.clone(), env.clone(), searchable);
            if evaluation.is_searchable() {
                evaluation.applicable = Some(detector.applicable(&env));
            }
            evaluations.push(evaluation);
        }
    }

    let applicable = evaluations.iter().filter(|e| e.is_applicable()).count();
    info!(
        evaluations = evaluations.len(),
        applicable, "Detector search complete"
    );

    Ok(evaluations)
}

/// Collects (directory, depth) pairs under `root`, bounded by `max_depth`,
/// in deterministic sorted order.
fn walk_directories(root: &Path, max_depth: usize) -> Result<Vec<(PathBuf, usize)>> {
    let mut override_builder = OverrideBuilder::new(root);
    for excluded in EXCLUDED_DIRS {
        override_builder.add(&format!("!{excluded}/")).ok();
    }
    let overrides = override_builder
        .build()
        .context("failed to build directory exclusions")?;

    let has_git_dir = root.join(".git").exists();

    let mut directories = Vec::new();
    for result in WalkBuilder::new(root)
        .max_depth(Some(max_depth))
        .hidden(false)
        .git_ignore(has_git_dir)
        .git_global(false)
        .git_exclude(false)
        .overrides(overrides)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let depth = path
            .strip_prefix(root)
            .map(|rel| rel.components().count())
            .unwrap_or(0);
        directories.push((path.to_path_buf(), depth));
    }

    directories.sort();
    Ok(directories)
}
