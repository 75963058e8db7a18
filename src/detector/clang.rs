//! Clang compilation-database detector
//!
//! The one extractor that digs below declared manifests: it resolves the
//! headers a build actually consumed into the Linux packages that own
//! them. The heavy lifting lives in [`crate::clang`].

use super::{Detector, DetectorEnvironment, DetectorResult, DetectorType, Extraction, ExtractionContext};
use crate::clang::{
    ClangPackageManager, ClangResolver, CompilerDepsFileManager,
};
use crate::clang::dpkg::DpkgPackageManager;
use crate::clang::rpm::RpmPackageManager;
use crate::exec::CommandRunner;
use crate::graph::{CodeLocation, DependencyGraph, ExternalId};
use crate::session::RunSession;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info};

const COMPILE_COMMANDS_JSON: &str = "compile_commands.json";

pub struct ClangDetector {
    runner: Arc<dyn CommandRunner>,
    session: Arc<RunSession>,
    cleanup: bool,
}

impl ClangDetector {
    pub fn new(runner: Arc<dyn CommandRunner>, session: Arc<RunSession>, cleanup: bool) -> Self {
        Self {
            runner,
            session,
            cleanup,
        }
    }

    fn available_package_manager(&self) -> Option<Box<dyn ClangPackageManager>> {
        let candidates: Vec<Box<dyn ClangPackageManager>> = vec![
            Box::new(DpkgPackageManager),
            Box::new(RpmPackageManager),
        ];
        candidates
            .into_iter()
            .find(|pkg_mgr| pkg_mgr.present(self.runner.as_ref()))
    }
}

impl Detector for ClangDetector {
    fn detector_type(&self) -> DetectorType {
        DetectorType::Clang
    }

    fn name(&self) -> &'static str {
        "clang compilation database"
    }

    fn applicable(&self, env: &DetectorEnvironment) -> DetectorResult {
        if env.has_file(COMPILE_COMMANDS_JSON) {
            DetectorResult::Passed
        } else {
            DetectorResult::file_not_found(COMPILE_COMMANDS_JSON)
        }
    }

    fn extractable(&self, _env: &DetectorEnvironment) -> DetectorResult {
        match self.available_package_manager() {
            Some(pkg_mgr) => {
                debug!(pkg_mgr = pkg_mgr.name(), "Found supported package manager");
                DetectorResult::Passed
            }
            None => DetectorResult::executable_not_found("dpkg or rpm"),
        }
    }

    fn extract(&self, env: &DetectorEnvironment, ctx: &ExtractionContext) -> Extraction {
        match self.try_extract(env, ctx) {
            Ok(extraction) => extraction,
            Err(error) => Extraction::exception(error),
        }
    }
}

impl ClangDetector {
    fn try_extract(&self, env: &DetectorEnvironment, ctx: &ExtractionContext) -> Result<Extraction> {
        let pkg_mgr = self
            .available_package_manager()
            .ok_or_else(|| anyhow!("no supported package manager responded"))?;

        fs::create_dir_all(&ctx.output_dir).with_context(|| {
            format!(
                "failed to create extraction output directory {}",
                ctx.output_dir.display()
            )
        })?;

        let database = env.file(COMPILE_COMMANDS_JSON);
        info!(
            database = %database.display(),
            pkg_mgr = pkg_mgr.name(),
            "Resolving native dependencies"
        );

        let deps_source = CompilerDepsFileManager::new(Arc::clone(&self.runner), self.cleanup);
        let resolver = ClangResolver::new(&self.session, self.runner.as_ref(), &deps_source);
        let resolved = resolver.resolve(
            &database,
            &env.directory,
            &ctx.output_dir,
            pkg_mgr.as_ref(),
        )?;

        let dir_name = env
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "native-project".to_string());
        let external_id =
            ExternalId::name_version(pkg_mgr.default_forge(), dir_name, "compile-commands");

        let location = CodeLocation::new(
            env.directory.clone(),
            DetectorType::Clang,
            external_id,
            DependencyGraph::new(resolved.dependencies),
        );
        Ok(Extraction::success(vec![location]))
    }
}
