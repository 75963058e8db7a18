//! rpm package-manager collaborator

use super::package_manager::{ClangPackageManager, DependencyFileDetails, PackageDetails};
use crate::exec::CommandRunner;
use crate::graph::{Forge, CENTOS, FEDORA, REDHAT};
use std::path::Path;
use tracing::{debug, trace};

const FORGES: &[Forge] = &[CENTOS, FEDORA, REDHAT];
const QUERY_FORMAT: &str = "%{NAME}\\n%{VERSION}-%{RELEASE}\\n%{ARCH}\\n";

/// Maps files to owning packages via `rpm -qf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RpmPackageManager;

impl ClangPackageManager for RpmPackageManager {
    fn name(&self) -> &'static str {
        "rpm"
    }

    fn present(&self, runner: &dyn CommandRunner) -> bool {
        runner.executable_exists("rpm", "--version")
    }

    fn packages_owning(
        &self,
        runner: &dyn CommandRunner,
        _root_dir: &Path,
        file: &DependencyFileDetails,
    ) -> Vec<PackageDetails> {
        let path = file.path.to_string_lossy();
        let output = match runner.run(
            "rpm",
            &["-qf", &path, "--queryformat", QUERY_FORMAT],
            Path::new("."),
        ) {
            Ok(output) if output.succeeded() => output,
            Ok(output) => {
                trace!(file = %path, exit_code = ?output.exit_code, "rpm -qf reported no owner");
                return Vec::new();
            }
            Err(err) => {
                debug!(file = %path, error = %err, "rpm -qf failed");
                return Vec::new();
            }
        };

        parse_query_output(&output.stdout)
    }

    fn forges(&self) -> &'static [Forge] {
        FORGES
    }

    fn default_forge(&self) -> Forge {
        CENTOS
    }
}

/// Parses the three-line-per-package query output. A file owned by more
/// than one package yields multiple records.
fn parse_query_output(stdout: &str) -> Vec<PackageDetails> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines
        .iter()
        .any(|l| l.contains("is not owned by any package"))
    {
        return Vec::new();
    }

    lines
        .chunks(3)
        .filter(|chunk| chunk.len() == 3)
        .map(|chunk| PackageDetails::new(chunk[0], chunk[1], chunk[2]))
        .collect()
}
