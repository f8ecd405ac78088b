//! Filepath: src/infra/walk.rs
//! Go source tree walker.
//! - Prunes ignored directory names (default: `typegen`) below the root
//! - Prunes hidden directories (leading `.`) below the root
//! - Extra ignore globs on root-relative paths (early prune)
//! - Groups non-test `.go` files by their directory
//! - Deterministic ordering for stable output
//!
//! Backed by ripgrep's `ignore` crate and `globset`. Gitignore rules are
//! deliberately off: the Go toolchain builds packages regardless of them.
//!
//! Any unreadable entry aborts the walk. Partial discovery would silently
//! change which packages are generated.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::trace;

use crate::error::{Result, TypegenError};

/// Directory names skipped by default (the generator's own package)
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["typegen"];

/// One directory holding compilable Go sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDir
{
    /// Absolute directory path
    pub dir: PathBuf,

    /// Slash-separated path relative to the walk root ("" for the root)
    pub rel: String,

    /// Sorted non-test `.go` files directly inside `dir`
    pub files: Vec<PathBuf>,
}

/// Walker over Go package directories with pruning rules.
pub struct SourceWalker
{
    /// Directory names pruned anywhere below the root
    ignored_dirs: Vec<String>,

    /// Compiled set of additional ignore patterns (root-relative)
    ignore_patterns: GlobSet,
}

impl SourceWalker
{
    /// Build a walker with additional ignore globs (e.g., "vendor/**",
    /// "internal/mocks"). Patterns match on root-relative directory paths.
    pub fn new(additional_ignores: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            let glob = Glob::new(pattern).map_err(|e| {
                TypegenError::config(format!("invalid ignore glob `{pattern}`: {e}"))
            })?;
            builder.add(glob);
        }

        let ignore_patterns = builder
            .build()
            .map_err(|e| TypegenError::config(format!("ignore globs: {e}")))?;

        Ok(Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore_patterns,
        })
    }

    /// (Optional) Replace the pruned directory names.
    pub fn with_ignored_dirs(
        mut self,
        names: &[String],
    ) -> Self
    {
        self.ignored_dirs = names.to_vec();
        self
    }


    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // No .gitignore/.ignore/hidden handling from the crate itself;
        // pruning below is the only policy.
        b.standard_filters(false);
        b.follow_links(false);

        let names = self
            .ignored_dirs
            .clone();
        let extra = self
            .ignore_patterns
            .clone();
        let root_owned = root.to_path_buf();

        b.filter_entry(move |ent: &DirEntry| {
            // The root itself is never pruned
            if ent.depth() == 0
            {
                return true;
            }

            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);
            if !is_dir
            {
                return true;
            }

            let name = ent
                .file_name()
                .to_string_lossy();
            if name.starts_with('.')
                || names
                    .iter()
                    .any(|n| n.as_str() == name.as_ref())
            {
                return false;
            }

            let rel = ent
                .path()
                .strip_prefix(&root_owned)
                .unwrap_or(ent.path());
            !extra.is_match(rel)
        });

        b
    }

    /// Walk `root` and return every directory with non-test Go files,
    /// sorted by directory path.
    pub fn walk_source_dirs<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<Vec<SourceDir>>
    {
        let root_path = root.as_ref();
        let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

        for res in self
            .build_walk(root_path)
            .build()
        {
            let entry = res.map_err(|source| TypegenError::Walk {
                root: root_path.to_path_buf(),
                source,
            })?;

            let is_file = entry
                .file_type()
                .is_some_and(|ft| ft.is_file());
            if !is_file || !is_go_source(entry.path())
            {
                continue;
            }

            let path = entry.into_path();
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root_path.to_path_buf());
            trace!(file = %path.display(), "go source");
            by_dir
                .entry(dir)
                .or_default()
                .push(path);
        }

        let out = by_dir
            .into_iter()
            .map(|(dir, mut files)| {
                files.sort();
                let rel = relative_slash_path(root_path, &dir);
                SourceDir { dir, rel, files }
            })
            .collect();

        Ok(out)
    }
}

/// `true` for `*.go` files that are not `*_test.go`
pub fn is_go_source(path: &Path) -> bool
{
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
}

/// Root-relative path joined with `/` ("" when `path == root`)
pub fn relative_slash_path(
    root: &Path,
    path: &Path,
) -> String
{
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path);

    rel.components()
        .map(|c| {
            c.as_os_str()
                .to_string_lossy()
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn rels(dirs: &[SourceDir]) -> Vec<&str>
    {
        dirs.iter()
            .map(|d| d.rel.as_str())
            .collect()
    }

    #[test]
    fn groups_go_files_by_directory() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "root.go", "package pkg")?;
        write_file(root, "foo/b.go", "package foo")?;
        write_file(root, "foo/a.go", "package foo")?;
        write_file(root, "foo/nested/x.go", "package nested")?;
        write_file(root, "docs/README.md", "# docs")?;

        let dirs = SourceWalker::new(&[])?.walk_source_dirs(root)?;

        assert_eq!(rels(&dirs), vec!["", "foo", "foo/nested"]);
        let foo = &dirs[1];
        let names: Vec<_> = foo
            .files
            .iter()
            .map(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
        Ok(())
    }

    #[test]
    fn test_only_directories_are_not_packages() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "only_tests/x_test.go", "package only")?;
        write_file(root, "real/x.go", "package real")?;
        write_file(root, "real/x_test.go", "package real")?;

        let dirs = SourceWalker::new(&[])?.walk_source_dirs(root)?;
        assert_eq!(rels(&dirs), vec!["real"]);
        assert_eq!(dirs[0].files.len(), 1);
        Ok(())
    }

    #[test]
    fn prunes_hidden_and_ignored_dirs() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, ".cache/x.go", "package cache")?;
        write_file(root, "typegen/gen.go", "package typegen")?;
        write_file(root, "typegen/inner/gen.go", "package inner")?;
        write_file(root, "vendor/lib/v.go", "package lib")?;
        write_file(root, "api/api.go", "package api")?;

        let dirs = SourceWalker::new(&["vendor".to_string()])?.walk_source_dirs(root)?;
        assert_eq!(rels(&dirs), vec!["api"]);

        let dirs = SourceWalker::new(&[])?
            .with_ignored_dirs(&[])
            .walk_source_dirs(root)?;
        assert_eq!(
            rels(&dirs),
            vec!["api", "typegen", "typegen/inner", "vendor/lib"]
        );
        Ok(())
    }

    #[test]
    fn missing_root_is_a_walk_error() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let missing = tmp
            .path()
            .join("nope");

        let err = SourceWalker::new(&[])?
            .walk_source_dirs(&missing)
            .unwrap_err();
        assert!(matches!(err, TypegenError::Walk { .. }), "got {err:?}");
        Ok(())
    }

    #[test]
    fn go_source_detection()
    {
        assert!(is_go_source(Path::new("a/b.go")));
        assert!(!is_go_source(Path::new("a/b_test.go")));
        assert!(!is_go_source(Path::new("a/b.gox")));
        assert!(!is_go_source(Path::new("a/go")));
    }
}
