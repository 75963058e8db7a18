//! Dependency graph model
//!
//! A [`CodeLocation`] is the unit a successful extraction hands to the
//! assembler: one named subgraph of [`Dependency`] nodes, each qualified by
//! the forge it came from. Two packages with the same name and version but
//! different forge or architecture are distinct nodes.

use crate::detector::DetectorType;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// A namespace/registry identity used to qualify an external package id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Forge {
    pub name: &'static str,
}

impl Forge {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

pub const NPMJS: Forge = Forge::new("npmjs");
pub const MAVEN: Forge = Forge::new("maven");
pub const ANACONDA: Forge = Forge::new("anaconda");
pub const UBUNTU: Forge = Forge::new("ubuntu");
pub const DEBIAN: Forge = Forge::new("debian");
pub const CENTOS: Forge = Forge::new("centos");
pub const FEDORA: Forge = Forge::new("fedora");
pub const REDHAT: Forge = Forge::new("redhat");

/// Forge-qualified, optionally architecture-qualified external identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExternalId {
    pub forge: Forge,
    pub name: String,
    pub version: String,
    pub architecture: Option<String>,
}

impl ExternalId {
    pub fn name_version(forge: Forge, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            forge,
            name: name.into(),
            version: version.into(),
            architecture: None,
        }
    }

    pub fn architecture(
        forge: Forge,
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            forge,
            name: name.into(),
            version: version.into(),
            architecture: Some(architecture.into()),
        }
    }

    /// Canonical reference string, unique per (forge, name, version, arch).
    pub fn bom_ref(&self) -> String {
        match &self.architecture {
            Some(arch) => format!("{}:{}/{}/{}", self.forge.name, self.name, self.version, arch),
            None => format!("{}:{}/{}", self.forge.name, self.name, self.version),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub external_id: ExternalId,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>, external_id: ExternalId) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            external_id,
        }
    }
}

/// Flat set of direct dependencies discovered by one extraction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    dependencies: Vec<Dependency>,
}

impl DependencyGraph {
    pub fn new(mut dependencies: Vec<Dependency>) -> Self {
        dependencies.sort_by(|a, b| a.external_id.bom_ref().cmp(&b.external_id.bom_ref()));
        dependencies.dedup_by(|a, b| a.external_id == b.external_id);
        Self { dependencies }
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// A named dependency subgraph tied to the directory and detector that
/// produced it.
#[derive(Debug, Clone, Serialize)]
pub struct CodeLocation {
    pub name: String,
    pub source_path: PathBuf,
    pub detector_type: DetectorType,
    pub external_id: ExternalId,
    pub graph: DependencyGraph,
}

impl CodeLocation {
    pub fn new(
        source_path: PathBuf,
        detector_type: DetectorType,
        external_id: ExternalId,
        graph: DependencyGraph,
    ) -> Self {
        let dir_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_path.to_string_lossy().into_owned());
        let name = format!("{}/{} bom", dir_name, detector_type);
        Self {
            name,
            source_path,
            detector_type,
            external_id,
            graph,
        }
    }

    /// Content identity: two locations with the same identity carry the same
    /// dependency set for the same external id and collapse to one document.
    pub fn content_identity(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.external_id.bom_ref().as_bytes());
        for dep in self.graph.dependencies() {
            hasher.update(dep.external_id.bom_ref().as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_ref_includes_architecture() {
        let id = ExternalId::architecture(UBUNTU, "libc6", "2.31", "amd64");
        assert_eq!(id.bom_ref(), "ubuntu:libc6/2.31/amd64");
    }

    #[test]
    fn test_bom_ref_without_architecture() {
        let id = ExternalId::name_version(NPMJS, "left-pad", "1.3.0");
        assert_eq!(id.bom_ref(), "npmjs:left-pad/1.3.0");
    }

    #[test]
    fn test_same_name_version_different_forge_are_distinct() {
        let a = ExternalId::architecture(UBUNTU, "zlib", "1.2.11", "amd64");
        let b = ExternalId::architecture(DEBIAN, "zlib", "1.2.11", "amd64");
        assert_ne!(a, b);
        assert_ne!(a.bom_ref(), b.bom_ref());
    }

    #[test]
    fn test_graph_dedups_by_external_id() {
        let id = ExternalId::architecture(UBUNTU, "zlib", "1.2.11", "amd64");
        let graph = DependencyGraph::new(vec![
            Dependency::new("zlib", "1.2.11", id.clone()),
            Dependency::new("zlib", "1.2.11", id),
        ]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_content_identity_is_stable_across_directories() {
        let id = ExternalId::architecture(UBUNTU, "zlib", "1.2.11", "amd64");
        let graph = DependencyGraph::new(vec![Dependency::new("zlib", "1.2.11", id.clone())]);
        let a = CodeLocation::new(
            PathBuf::from("/src/a"),
            DetectorType::Clang,
            id.clone(),
            graph.clone(),
        );
        let b = CodeLocation::new(PathBuf::from("/src/b"), DetectorType::Clang, id, graph);
        // Same external id and dependency set, so the identities match even
        // though the locations were discovered in different directories.
        assert_eq!(a.content_identity(), b.content_identity());
    }
}
