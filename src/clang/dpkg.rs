//! dpkg package-manager collaborator

use super::package_manager::{ClangPackageManager, DependencyFileDetails, PackageDetails};
use crate::exec::CommandRunner;
use crate::graph::{Forge, DEBIAN, UBUNTU};
use std::path::Path;
use tracing::{debug, trace};

const FORGES: &[Forge] = &[UBUNTU, DEBIAN];

/// Maps files to owning packages via `dpkg -S` and `dpkg -s`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DpkgPackageManager;

impl ClangPackageManager for DpkgPackageManager {
    fn name(&self) -> &'static str {
        "dpkg"
    }

    fn present(&self, runner: &dyn CommandRunner) -> bool {
        runner.executable_exists("dpkg", "--version")
    }

    fn packages_owning(
        &self,
        runner: &dyn CommandRunner,
        _root_dir: &Path,
        file: &DependencyFileDetails,
    ) -> Vec<PackageDetails> {
        let path = file.path.to_string_lossy();
        let output = match runner.run("dpkg", &["-S", &path], Path::new(".")) {
            Ok(output) if output.succeeded() => output,
            Ok(output) => {
                trace!(file = %path, exit_code = ?output.exit_code, "dpkg -S reported no owner");
                return Vec::new();
            }
            Err(err) => {
                debug!(file = %path, error = %err, "dpkg -S failed");
                return Vec::new();
            }
        };

        let mut packages = Vec::new();
        for line in output.stdout.lines() {
            let Some((name, architecture)) = parse_owner_line(line) else {
                continue;
            };
            let version = self.query_version(runner, &name);
            packages.push(PackageDetails {
                name: Some(name),
                version,
                architecture: Some(architecture),
            });
        }
        packages
    }

    fn forges(&self) -> &'static [Forge] {
        FORGES
    }

    fn default_forge(&self) -> Forge {
        UBUNTU
    }
}

impl DpkgPackageManager {
    fn query_version(&self, runner: &dyn CommandRunner, package_name: &str) -> Option<String> {
        let output = runner.run("dpkg", &["-s", package_name], Path::new(".")).ok()?;
        if !output.succeeded() {
            return None;
        }
        parse_version_field(&output.stdout)
    }
}

/// Parses one `dpkg -S` line, e.g.
/// `libc6-dev:amd64: /usr/include/stdio.h` -> ("libc6-dev", "amd64").
/// Diversion lines are not ownership records and are skipped.
fn parse_owner_line(line: &str) -> Option<(String, String)> {
    if line.trim().is_empty() || line.starts_with("diversion by") {
        return None;
    }
    let owner = line.split(": ").next()?;
    let mut parts = owner.splitn(2, ':');
    let name = parts.next()?.trim();
    if name.is_empty() {
        return None;
    }
    let architecture = parts.next().unwrap_or("").trim();
    if architecture.is_empty() {
        return None;
    }
    Some((name.to_string(), architecture.to_string()))
}

/// Pulls the `Version:` field out of `dpkg -s` output.
fn parse_version_field(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
