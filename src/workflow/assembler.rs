//! Code location assembly
//!
//! Folds the code locations from all successful extractions into BOM
//! documents. Two mutually exclusive modes: per-directory (one document per
//! deduplicated location, with per-type failure bookkeeping for locations
//! that carried nothing usable) and aggregate (everything merged into a
//! single document; no failure bookkeeping).

use crate::config::ScoutConfig;
use crate::detector::DetectorType;
use crate::graph::{CodeLocation, Dependency};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct AssemblyResult {
    pub bom_files: Vec<PathBuf>,
    pub failed_types: BTreeSet<DetectorType>,
}

#[derive(Serialize)]
struct BomDocument<'a> {
    project_name: &'a str,
    project_version: &'a str,
    code_location: &'a str,
    dependencies: Vec<&'a Dependency>,
}

/// Assembles `code_locations` into one or many documents under
/// `config.output_dir`, per the configured mode.
pub fn assemble(
    code_locations: &[CodeLocation],
    project_name: &str,
    project_version: &str,
    config: &ScoutConfig,
) -> Result<AssemblyResult> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    match &config.aggregate_name {
        Some(aggregate_name) => assemble_aggregate(
            code_locations,
            project_name,
            project_version,
            aggregate_name,
            &config.output_dir,
        ),
        None => assemble_per_directory(
            code_locations,
            project_name,
            project_version,
            &config.output_dir,
        ),
    }
}

fn assemble_per_directory(
    code_locations: &[CodeLocation],
    project_name: &str,
    project_version: &str,
    output_dir: &Path,
) -> Result<AssemblyResult> {
    let mut result = AssemblyResult::default();
    let mut seen_identities: HashSet<String> = HashSet::new();
    let mut used_names: HashSet<String> = HashSet::new();

    for location in code_locations {
        if location.graph.is_empty() {
            warn!(
                location = %location.name,
                "Code location has no dependencies; skipping it"
            );
            result.failed_types.insert(location.detector_type);
            continue;
        }

        let identity = location.content_identity();
        if !seen_identities.insert(identity) {
            debug!(
                location = %location.name,
                "Code location duplicates an earlier one; skipping it"
            );
            continue;
        }

        let document = BomDocument {
            project_name,
            project_version,
            code_location: &location.name,
            dependencies: location.graph.dependencies().iter().collect(),
        };
        let file_name = unique_file_name(&location.name, &mut used_names);
        let path = write_document(&document, output_dir, &file_name)?;
        result.bom_files.push(path);
    }

    info!(
        documents = result.bom_files.len(),
        "Assembled per-directory BOM documents"
    );
    Ok(result)
}

fn assemble_aggregate(
    code_locations: &[CodeLocation],
    project_name: &str,
    project_version: &str,
    aggregate_name: &str,
    output_dir: &Path,
) -> Result<AssemblyResult> {
    let mut merged: Vec<&Dependency> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for location in code_locations {
        for dependency in location.graph.dependencies() {
            if seen.insert(dependency.external_id.bom_ref()) {
                merged.push(dependency);
            }
        }
    }

    let document = BomDocument {
        project_name,
        project_version,
        code_location: aggregate_name,
        dependencies: merged,
    };
    let file_name = format!("{}_bom.json", sanitize(aggregate_name));
    let path = write_document(&document, output_dir, &file_name)?;

    info!(
        dependencies = seen.len(),
        "Assembled aggregate BOM document"
    );
    Ok(AssemblyResult {
        bom_files: vec![path],
        failed_types: BTreeSet::new(),
    })
}

fn write_document(document: &BomDocument<'_>, output_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = output_dir.join(file_name);
    let json = serde_json::to_string_pretty(document).context("failed to serialize BOM document")?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write BOM document {}", path.display()))?;
    debug!(file = %path.display(), "Wrote BOM document");
    Ok(path)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

/// Distinct locations can share a directory name; suffix an ordinal rather
/// than letting a later document clobber an earlier one.
fn unique_file_name(location_name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize(location_name);
    let mut candidate = format!("{base}_bom.json");
    let mut ordinal = 1;
    while !used.insert(candidate.clone()) {
        ordinal += 1;
        candidate = format!("{base}_{ordinal}_bom.json");
    }
    candidate
}
