//! Module path discovery: walk upward from a directory to the nearest
//! `go.mod` and read its `module` directive.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TypegenError};

/// A located `go.mod` and the module path it declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule
{
    /// Directory containing `go.mod`
    pub dir: PathBuf,

    /// Declared module path (e.g. `example.com/test`)
    pub path: String,
}

impl GoModule
{
    /// Find the closest `go.mod` at or above `start`.
    pub fn find(start: &Path) -> Result<Self>
    {
        for dir in start.ancestors()
        {
            let manifest = dir.join("go.mod");
            if !manifest.is_file()
            {
                continue;
            }

            let data = std::fs::read_to_string(&manifest)
                .map_err(|e| TypegenError::io(&manifest, e))?;
            let path = parse_module_path(&data).ok_or_else(|| {
                TypegenError::config(format!(
                    "module directive not found in {}",
                    manifest.display()
                ))
            })?;

            debug!(manifest = %manifest.display(), module = %path, "found go.mod");
            return Ok(Self { dir: dir.to_path_buf(), path });
        }

        Err(TypegenError::config(format!("go.mod not found from {}", start.display())))
    }

    /// Import path of `pkg_dir` inside this module.
    pub fn import_path_of(
        &self,
        pkg_dir: &Path,
    ) -> String
    {
        let rel = crate::infra::walk::relative_slash_path(&self.dir, pkg_dir);
        if rel.is_empty()
        {
            self.path
                .clone()
        }
        else
        {
            format!("{}/{}", self.path, rel)
        }
    }
}

/// Extract the module path from `go.mod` text.
pub fn parse_module_path(data: &str) -> Option<String>
{
    data.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("module ") || line.starts_with("module\t"))
        .find_map(|line| {
            line.split_whitespace()
                .nth(1)
        })
        .map(|p| {
            p.trim_matches('"')
                .to_string()
        })
}

/// Resolve the root import path: an explicit override (trailing `/`
/// trimmed) or the module path joined with the directory's location
/// inside the module.
pub fn resolve_import_path(
    pkg_dir: &Path,
    explicit: Option<&str>,
) -> Result<String>
{
    if let Some(p) = explicit.filter(|p| !p.is_empty())
    {
        return Ok(p
            .trim_end_matches('/')
            .to_string());
    }

    let module = GoModule::find(pkg_dir)?;
    Ok(module.import_path_of(pkg_dir))
}
