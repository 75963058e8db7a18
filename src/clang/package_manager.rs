//! Linux package-manager collaborator contract

use crate::exec::CommandRunner;
use crate::graph::Forge;
use std::path::{Path, PathBuf};

/// The unit of package dedup memoization. Equality is by the full triple;
/// any field a package manager could not report stays `None` and the
/// package is later dropped from output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageDetails {
    pub name: Option<String>,
    pub version: Option<String>,
    pub architecture: Option<String>,
}

impl PackageDetails {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            architecture: Some(architecture.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.version.is_some() && self.architecture.is_some()
    }
}

/// A dependency file queued for ownership lookup, with whether it sits
/// under the declared root directory.
#[derive(Debug, Clone)]
pub struct DependencyFileDetails {
    pub in_root_dir: bool,
    pub path: PathBuf,
}

/// Contract the native resolver consumes: map a file to the packages that
/// own it, and declare which forges qualify those packages.
pub trait ClangPackageManager: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this package manager responds on the current host.
    fn present(&self, runner: &dyn CommandRunner) -> bool;

    /// Packages owning `file`. An empty result means no known package owns
    /// it; the resolver decides whether that makes the file "unmanaged".
    fn packages_owning(
        &self,
        runner: &dyn CommandRunner,
        root_dir: &Path,
        file: &DependencyFileDetails,
    ) -> Vec<PackageDetails>;

    fn forges(&self) -> &'static [Forge];

    fn default_forge(&self) -> Forge;
}
