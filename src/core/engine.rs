//! Conversion engine seam.
//!
//! The pipeline only sees the engine's text output; everything it needs
//! is carried by the `// From <origin>` block contract.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    core::{discover::PackageDescriptor, prefix::DeclNamer},
    error::{Result, TypegenError},
    infra::io::read_file_smart,
    parsers::{
        GoParser,
        go_parser::GoFile,
        ts_emitter::{FileEmitter, GENERATED_HEADER, PackageScope, collect_enum_values},
    },
};

pub trait ConversionEngine: Send + Sync
{
    /// Turn `packages` into declaration text made of a header and
    /// `// From <origin>` blocks.
    fn convert(
        &self,
        packages: &[PackageDescriptor],
    ) -> String;
}

/// One package's parsed files with their block origins
#[derive(Debug)]
pub struct LoadedPackage
{
    pub import_path: String,
    pub files: Vec<(String, GoFile)>,
}

/// Built-in tree-sitter based engine
#[derive(Debug, Clone)]
pub struct GoConverter
{
    namer: DeclNamer,
}

impl GoConverter
{
    pub fn new(namer: DeclNamer) -> Self
    {
        Self { namer }
    }

    /// Read and parse every file of one package.
    ///
    /// Any unreadable or unparsable file fails the whole package.
    pub fn load_package(
        &self,
        parser: &GoParser,
        pkg: &PackageDescriptor,
    ) -> Result<LoadedPackage>
    {
        let fail = |reason: String| TypegenError::Conversion { package: pkg.import_path.clone(), reason };

        let mut files = Vec::with_capacity(
            pkg.files
                .len(),
        );
        for path in &pkg.files
        {
            let content = read_file_smart(path).map_err(|e| fail(e.to_string()))?;
            let text = content
                .as_str()
                .map_err(|e| fail(format!("{}: invalid UTF-8: {e}", path.display())))?;
            let parsed = parser
                .parse(text, path)
                .map_err(|e| fail(e.to_string()))?;

            let file_name = path
                .file_name()
                .map(|n| {
                    n.to_string_lossy()
                        .into_owned()
                })
                .unwrap_or_default();
            let origin = if pkg
                .rel_dir
                .is_empty()
            {
                file_name
            }
            else
            {
                format!("{}/{file_name}", pkg.rel_dir)
            };
            files.push((origin, parsed));
        }

        Ok(LoadedPackage { import_path: pkg.import_path.clone(), files })
    }

    /// Render loaded packages in order, after the generated-file header.
    pub fn render(
        &self,
        packages: &[LoadedPackage],
        known_packages: &HashSet<String>,
    ) -> String
    {
        let mut out = vec![GENERATED_HEADER.to_string(), String::new()];

        for pkg in packages
        {
            let scope = PackageScope {
                import_path: &pkg.import_path,
                namer: &self.namer,
                known_packages,
            };

            // Enum constants may live in any file of the package
            let parsed: Vec<&GoFile> = pkg
                .files
                .iter()
                .map(|(_, f)| f)
                .collect();
            let enums = collect_enum_values(&parsed);

            for (origin, file) in &pkg.files
            {
                FileEmitter::new(&scope, file, origin).emit(&enums, &mut out);
            }
        }

        out.join("\n")
    }
}

impl ConversionEngine for GoConverter
{
    #[instrument(level = "debug", skip_all, fields(packages = packages.len()))]
    fn convert(
        &self,
        packages: &[PackageDescriptor],
    ) -> String
    {
        let parser = GoParser::new();
        let known: HashSet<String> = packages
            .iter()
            .map(|p| {
                p.import_path
                    .clone()
            })
            .collect();

        let results: Vec<Result<LoadedPackage>> = packages
            .par_iter()
            .map(|pkg| self.load_package(&parser, pkg))
            .collect();

        let mut loaded = Vec::with_capacity(results.len());
        for result in results
        {
            match result
            {
                Ok(pkg) => loaded.push(pkg),
                Err(e) => warn!(error = %e, "skipping package"),
            }
        }

        debug!(converted = loaded.len(), skipped = packages.len() - loaded.len(), "packages loaded");
        self.render(&loaded, &known)
    }
}
