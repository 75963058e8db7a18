//! Native dependency resolution pipeline
//!
//! Each stage is a set-producing transform over the previous stage's
//! output; stages fan out across the rayon pool once the prior set is
//! materialized. The session's two guarded sets are the only shared mutable
//! state: they enforce at-most-once processing of every physical artifact
//! for the lifetime of the run, not just within one call.

use super::compile_commands::parse_compile_commands;
use super::deps_file::DependencyFileSource;
use super::package_manager::{ClangPackageManager, DependencyFileDetails, PackageDetails};
use crate::detector::is_under_dir;
use crate::exec::CommandRunner;
use crate::graph::Dependency;
use crate::graph::ExternalId;
use crate::session::RunSession;
use anyhow::Result;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, trace};

/// Resolver output: deduplicated dependency nodes plus the files the
/// package manager could not attribute to any package.
#[derive(Debug, Default)]
pub struct ResolvedGraph {
    pub dependencies: Vec<Dependency>,
    pub unmanaged_files: BTreeSet<PathBuf>,
}

pub struct ClangResolver<'a> {
    session: &'a RunSession,
    runner: &'a dyn CommandRunner,
    deps_source: &'a dyn DependencyFileSource,
}

impl<'a> ClangResolver<'a> {
    pub fn new(
        session: &'a RunSession,
        runner: &'a dyn CommandRunner,
        deps_source: &'a dyn DependencyFileSource,
    ) -> Self {
        Self {
            session,
            runner,
            deps_source,
        }
    }

    pub fn resolve(
        &self,
        compilation_database: &Path,
        root_dir: &Path,
        output_dir: &Path,
        pkg_mgr: &dyn ClangPackageManager,
    ) -> Result<ResolvedGraph> {
        info!(database = %compilation_database.display(), "Analyzing compilation database");

        let compile_commands = parse_compile_commands(compilation_database)?;
        debug!(commands = compile_commands.len(), "Parsed compile commands");

        // Stage 2: union of dependency file paths across all commands.
        let candidate_paths: HashSet<String> = compile_commands
            .par_iter()
            .flat_map_iter(|command| self.deps_source.dependency_file_paths(output_dir, command))
            .collect();

        // Stage 3: blanks out, already-seen out, missing-on-disk out.
        let dependency_files: Vec<DependencyFileDetails> = candidate_paths
            .par_iter()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .filter(|path| {
                if self.session.claim_dependency_file(path) {
                    true
                } else {
                    trace!(file = %path.display(), "Dependency file already processed; excluding it");
                    false
                }
            })
            .filter(|path| {
                if path.exists() {
                    true
                } else {
                    debug!(file = %path.display(), "Dependency file does not exist on disk; excluding it");
                    false
                }
            })
            .map(|path| DependencyFileDetails {
                in_root_dir: is_under_dir(root_dir, &path),
                path,
            })
            .collect();

        // Stage 4: ownership lookup; unowned files outside the root are
        // diagnostic-only.
        let unmanaged_files = Mutex::new(BTreeSet::new());
        let owned_packages: HashSet<PackageDetails> = dependency_files
            .par_iter()
            .flat_map_iter(|file| {
                trace!(file = %file.path.display(), "Querying package manager");
                let packages = pkg_mgr.packages_owning(self.runner, root_dir, file);
                debug!(
                    file = %file.path.display(),
                    packages = packages.len(),
                    "Package ownership query complete"
                );
                if packages.is_empty() && !file.in_root_dir {
                    unmanaged_files
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .insert(file.path.clone());
                }
                packages
            })
            .collect();

        // Stage 5: process-lifetime package dedup.
        let fresh_packages: Vec<PackageDetails> = owned_packages
            .into_iter()
            .filter(|pkg| {
                if self.session.claim_package(pkg) {
                    true
                } else {
                    trace!(?pkg, "Package already processed; excluding it");
                    false
                }
            })
            .collect();

        // Stage 6: one node per (package, relevant forge).
        let mut dependencies: Vec<Dependency> = fresh_packages
            .par_iter()
            .flat_map_iter(|pkg| package_to_dependencies(pkg, pkg_mgr))
            .collect();
        dependencies.sort_by(|a, b| a.external_id.bom_ref().cmp(&b.external_id.bom_ref()));

        let resolved = ResolvedGraph {
            dependencies,
            unmanaged_files: unmanaged_files.into_inner().unwrap_or_else(|e| e.into_inner()),
        };
        log_summary(&resolved);
        Ok(resolved)
    }
}

fn package_to_dependencies(
    pkg: &PackageDetails,
    pkg_mgr: &dyn ClangPackageManager,
) -> Vec<Dependency> {
    let (Some(name), Some(version), Some(arch)) = (&pkg.name, &pkg.version, &pkg.architecture)
    else {
        debug!(?pkg, "Package record is incomplete; dropping it");
        return Vec::new();
    };

    pkg_mgr
        .forges()
        .iter()
        .map(|forge| {
            let external_id = ExternalId::architecture(*forge, name, version, arch);
            trace!(external_id = %external_id.bom_ref(), "Adding dependency node");
            Dependency::new(name, version, external_id)
        })
        .collect()
}

fn log_summary(resolved: &ResolvedGraph) {
    info!(
        components = resolved.dependencies.len(),
        "Unique component external ids generated"
    );
    if !resolved.unmanaged_files.is_empty() {
        info!(
            count = resolved.unmanaged_files.len(),
            "Dependency files not recognized by the package manager:"
        );
        for file in &resolved.unmanaged_files {
            info!("\t{}", file.display());
        }
    }
}
