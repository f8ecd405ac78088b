//! Package discovery: every directory below the root holding non-test Go
//! sources becomes one package, identified by its import path.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    error::Result,
    infra::walk::{SourceDir, SourceWalker},
};

/// One discovered Go package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor
{
    /// Full import path (ordering key)
    pub import_path: String,

    /// Absolute directory
    pub dir: PathBuf,

    /// Slash-separated directory relative to the root ("" for the root)
    pub rel_dir: String,

    /// Sorted non-test `.go` files
    pub files: Vec<PathBuf>,
}

impl PackageDescriptor
{
    fn from_source_dir(
        root_import_path: &str,
        src: SourceDir,
    ) -> Self
    {
        let import_path = join_import_path(root_import_path, &src.rel);
        Self { import_path, dir: src.dir, rel_dir: src.rel, files: src.files }
    }
}

/// `root/rel`, or just `root` for the root directory itself
pub fn join_import_path(
    root_import_path: &str,
    rel: &str,
) -> String
{
    if rel.is_empty()
    {
        root_import_path.to_string()
    }
    else
    {
        format!("{root_import_path}/{rel}")
    }
}

/// Discover all packages under `root`, sorted by import path.
#[instrument(level = "debug", skip(walker), fields(root = %root.display()))]
pub fn discover_packages(
    walker: &SourceWalker,
    root: &Path,
    root_import_path: &str,
) -> Result<Vec<PackageDescriptor>>
{
    let mut packages: Vec<PackageDescriptor> = walker
        .walk_source_dirs(root)?
        .into_iter()
        .map(|src| PackageDescriptor::from_source_dir(root_import_path, src))
        .collect();

    packages.sort_by(|a, b| {
        a.import_path
            .cmp(&b.import_path)
    });
    packages.dedup_by(|a, b| a.import_path == b.import_path);

    debug!(count = packages.len(), "discovered packages");
    Ok(packages)
}
