//! Interface classification.
//!
//! Parses every non-test Go file directly (independent of the conversion
//! engine) and records the emitted name of each exported interface type.
//! Those names are removed from the final output. A single unreadable or
//! unparsable file fails the whole run: a partial exclusion set would let
//! interface types leak into the generated declarations.

use std::{collections::BTreeSet, path::Path};

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    core::{discover::join_import_path, prefix::{DeclNamer, is_exported}},
    error::{Result, TypegenError},
    infra::{io::read_file_smart, walk::SourceWalker},
    parsers::GoParser,
};

/// Names (as emitted) of exported interface-only types
pub type InterfaceExclusionSet = BTreeSet<String>;

/// Walk `root` on its own and collect the exclusion set.
#[instrument(level = "debug", skip(walker, namer), fields(root = %root.display()))]
pub fn collect_interface_names(
    walker: &SourceWalker,
    root: &Path,
    namer: &DeclNamer,
) -> Result<InterfaceExclusionSet>
{
    let parser = GoParser::new();

    // Flatten to (file, package import path) pairs for parallel parsing
    let files: Vec<(std::path::PathBuf, String)> = walker
        .walk_source_dirs(root)?
        .into_iter()
        .flat_map(|dir| {
            let import_path = join_import_path(namer.root_import_path(), &dir.rel);
            dir.files
                .into_iter()
                .map(move |f| (f, import_path.clone()))
        })
        .collect();

    let per_file: Vec<Result<Vec<String>>> = files
        .par_iter()
        .map(|(file, import_path)| interface_names_in_file(&parser, file, import_path, namer))
        .collect();

    // First failure in path order wins, independent of scheduling
    let mut out = InterfaceExclusionSet::new();
    for names in per_file
    {
        out.extend(names?);
    }

    debug!(count = out.len(), files = files.len(), "classified interfaces");
    Ok(out)
}

/// Emitted names of the exported interfaces declared in one file.
pub fn interface_names_in_file(
    parser: &GoParser,
    file: &Path,
    import_path: &str,
    namer: &DeclNamer,
) -> Result<Vec<String>>
{
    let content = read_file_smart(file)?;
    let text = content
        .as_str()
        .map_err(|e| TypegenError::Parse {
            path: file.to_path_buf(),
            reason: format!("invalid UTF-8: {e}"),
        })?;

    let parsed = parser.parse(text, file)?;

    Ok(parsed
        .types
        .iter()
        .filter(|t| t.is_interface() && is_exported(&t.name))
        .map(|t| namer.name(&t.name, import_path))
        .collect())
}
