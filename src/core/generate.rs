//! Generation pipeline.
//!
//! discover -> classify -> convert -> blocks -> whitelist + closure ->
//! interface filter -> dedup -> render. Configuration and patterns are
//! validated before any directory is walked.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    cli::{AppContext, GenerateArgs},
    core::{
        blocks::Declarations,
        classify::{InterfaceExclusionSet, collect_interface_names},
        dedup::deduplicate,
        discover::discover_packages,
        engine::{ConversionEngine, GoConverter},
        filter::filter_interface_types,
        prefix::{DeclNamer, TypeNameMapper},
        select::{Filters, filter_by_whitelist},
    },
    error::{Result, TypegenError},
    infra::{
        config::{Config, load_config},
        gomod::resolve_import_path,
        io::{OutputTarget, write_output},
        walk::{DEFAULT_IGNORED_DIRS, SourceWalker},
    },
};

/// Named bundle of filter and naming settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset
{
    pub include: Option<String>,
    pub include_type: Option<String>,
    pub strip_prefix: bool,
    pub disable_rename: bool,
}

impl Preset
{
    /// Options for `pkg_dir` with this preset's settings applied.
    pub fn options(
        &self,
        pkg_dir: impl Into<PathBuf>,
        pkg_path: Option<String>,
    ) -> Options
    {
        let mut opts = Options::new(pkg_dir);
        opts.pkg_path = pkg_path;
        self.apply(&mut opts);
        opts
    }

    fn apply(
        &self,
        opts: &mut Options,
    )
    {
        if let Some(include) = &self.include
        {
            opts.include = include.clone();
        }
        if let Some(include_type) = &self.include_type
        {
            opts.include_type = include_type.clone();
        }
        opts.strip_prefix |= self.strip_prefix;
        opts.disable_rename |= self.disable_rename;
    }
}

/// Everything one generation run needs
#[derive(Clone)]
pub struct Options
{
    /// Root Go source directory (required)
    pub pkg_dir: PathBuf,

    /// Root import path; discovered from `go.mod` when absent
    pub pkg_path: Option<String>,

    /// Origin pattern; empty disables
    pub include: String,

    /// Declared-name pattern; empty disables
    pub include_type: String,

    /// Emit bare Go names instead of package-prefixed ones
    pub strip_prefix: bool,

    /// Ignore `type_name_mapper`
    pub disable_rename: bool,

    /// `(declared_name, package_import_path) -> emitted name`
    pub type_name_mapper: Option<TypeNameMapper>,

    /// Directory names never treated as packages
    pub ignored_dirs: Vec<String>,

    /// Extra root-relative globs pruned during discovery
    pub ignore_patterns: Vec<String>,
}

impl Options
{
    pub fn new(pkg_dir: impl Into<PathBuf>) -> Self
    {
        Self { pkg_dir: pkg_dir.into(), ..Self::default() }
    }

    /// Namer shared by the engine and the interface classifier
    pub fn namer(
        &self,
        root_import_path: &str,
    ) -> DeclNamer
    {
        let mapper = if self.disable_rename
        {
            None
        }
        else
        {
            self.type_name_mapper
                .clone()
        };

        DeclNamer::new(root_import_path)
            .with_strip_prefix(self.strip_prefix)
            .with_mapper(mapper)
    }

    pub fn walker(&self) -> Result<SourceWalker>
    {
        Ok(SourceWalker::new(&self.ignore_patterns)?.with_ignored_dirs(&self.ignored_dirs))
    }
}

impl Default for Options
{
    fn default() -> Self
    {
        Self {
            pkg_dir: PathBuf::new(),
            pkg_path: None,
            include: String::new(),
            include_type: String::new(),
            strip_prefix: false,
            disable_rename: false,
            type_name_mapper: None,
            ignored_dirs: DEFAULT_IGNORED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl fmt::Debug for Options
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.debug_struct("Options")
            .field("pkg_dir", &self.pkg_dir)
            .field("pkg_path", &self.pkg_path)
            .field("include", &self.include)
            .field("include_type", &self.include_type)
            .field("strip_prefix", &self.strip_prefix)
            .field("disable_rename", &self.disable_rename)
            .field("type_name_mapper", &self.type_name_mapper.is_some())
            .field("ignored_dirs", &self.ignored_dirs)
            .field("ignore_patterns", &self.ignore_patterns)
            .finish()
    }
}

/// Expand `~`/`$VAR`, canonicalize, and require an existing directory.
pub fn resolve_pkg_dir(raw: &Path) -> Result<PathBuf>
{
    if raw
        .as_os_str()
        .is_empty()
    {
        return Err(TypegenError::config("pkg dir is required (--pkg-dir)"));
    }

    let raw_str = raw.to_string_lossy();
    let expanded = shellexpand::full(&raw_str)
        .map_err(|e| TypegenError::config(format!("cannot expand pkg dir `{raw_str}`: {e}")))?;

    let dir = dunce::canonicalize(&*expanded).map_err(|e| {
        TypegenError::config(format!("pkg dir `{}` is not accessible: {e}", raw.display()))
    })?;

    if !dir.is_dir()
    {
        return Err(TypegenError::config(format!("pkg dir `{}` is not a directory", dir.display())));
    }
    Ok(dir)
}

/// Everything validated up front, before any tree walk
struct Plan
{
    dir: PathBuf,
    filters: Filters,
    namer: DeclNamer,
    walker: SourceWalker,
}

impl Plan
{
    fn prepare(opts: &Options) -> Result<Self>
    {
        let dir = resolve_pkg_dir(&opts.pkg_dir)?;
        let filters = Filters::compile(&opts.include, &opts.include_type)?;
        let walker = opts.walker()?;
        let root_import_path = resolve_import_path(&dir, opts.pkg_path.as_deref())?;

        debug!(dir = %dir.display(), root = %root_import_path, "generation plan ready");
        Ok(Self { dir, filters, namer: opts.namer(&root_import_path), walker })
    }
}

/// Run the whole pipeline with the built-in engine.
pub fn generate_types(opts: &Options) -> Result<String>
{
    let plan = Plan::prepare(opts)?;
    let engine = GoConverter::new(
        plan.namer
            .clone(),
    );
    run_plan(&plan, &engine)
}

/// Run the whole pipeline with a caller-supplied engine.
pub fn generate_types_with(
    opts: &Options,
    engine: &dyn ConversionEngine,
) -> Result<String>
{
    let plan = Plan::prepare(opts)?;
    run_plan(&plan, engine)
}

/// Generate and write to `target`. An output failure is reported as
/// [`TypegenError::Output`] after generation succeeded.
pub fn generate_types_to_output(
    opts: &Options,
    target: &OutputTarget,
) -> Result<String>
{
    let text = generate_types(opts)?;
    write_output(&text, target)?;
    Ok(text)
}

#[instrument(level = "info", skip_all, fields(root = %plan.namer.root_import_path()))]
fn run_plan(
    plan: &Plan,
    engine: &dyn ConversionEngine,
) -> Result<String>
{
    let packages = discover_packages(&plan.walker, &plan.dir, plan.namer.root_import_path())?;
    let excluded = collect_interface_names(&plan.walker, &plan.dir, &plan.namer)?;

    let text = engine.convert(&packages);
    let shaped = shape(Declarations::parse(&text), &plan.filters, &excluded);

    info!(
        packages = packages.len(),
        interfaces = excluded.len(),
        declarations = shaped.blocks.len(),
        "generation finished"
    );
    Ok(shaped.render())
}

/// The post-generation stages in order: whitelist and closure, interface
/// filter, dedup.
pub fn shape(
    decls: Declarations,
    filters: &Filters,
    excluded: &InterfaceExclusionSet,
) -> Declarations
{
    let selected = filter_by_whitelist(decls, filters);
    let without_interfaces = filter_interface_types(selected, excluded);
    deduplicate(without_interfaces)
}

/// Merge CLI flags over the selected preset over the config file.
pub fn options_from_args(
    args: &GenerateArgs,
    cfg: &Config,
) -> Result<Options>
{
    let pkg_dir = args
        .pkg_dir
        .clone()
        .or_else(|| {
            cfg.generate
                .pkg_dir
                .clone()
        })
        .unwrap_or_default();

    let mut opts = Options::new(pkg_dir);
    opts.pkg_path = args
        .pkg_path
        .clone()
        .or_else(|| {
            cfg.generate
                .pkg_path
                .clone()
        });
    opts.include = cfg
        .generate
        .include
        .clone()
        .unwrap_or_default();
    opts.include_type = cfg
        .generate
        .include_type
        .clone()
        .unwrap_or_default();
    opts.strip_prefix = cfg
        .generate
        .strip_prefix;
    opts.disable_rename = cfg
        .generate
        .disable_rename;
    opts.ignored_dirs = cfg
        .ignored_dirs
        .clone();
    opts.ignore_patterns = cfg
        .ignore_patterns
        .iter()
        .chain(args.ignore.iter())
        .cloned()
        .collect();

    if let Some(name) = &args.preset
    {
        let preset = cfg
            .presets
            .get(name)
            .ok_or_else(|| {
                let known: Vec<&str> = cfg
                    .presets
                    .keys()
                    .map(String::as_str)
                    .collect();
                TypegenError::config(format!("unknown preset `{name}` (known: {})", known.join(", ")))
            })?;
        preset.apply(&mut opts);
    }

    if let Some(include) = &args.include
    {
        opts.include = include.clone();
    }
    if let Some(include_type) = &args.include_type
    {
        opts.include_type = include_type.clone();
    }
    opts.strip_prefix |= args.strip_prefix;
    opts.disable_rename |= args.disable_rename;

    Ok(opts)
}

/// `typegen generate`
pub fn run(
    args: GenerateArgs,
    ctx: &AppContext,
) -> anyhow::Result<()>
{
    let cfg = load_config()?;
    let opts = options_from_args(&args, &cfg)?;

    let out = args
        .out
        .clone()
        .or_else(|| {
            cfg.generate
                .out
                .clone()
        });
    let target = OutputTarget::resolve(out, args.stdout);

    let text = generate_types(&opts)?;
    write_output(&text, &target)?;

    if !ctx.quiet
        && let OutputTarget::File(path) = &target
    {
        let count = text
            .lines()
            .filter(|l| l.starts_with(crate::core::blocks::ORIGIN_MARKER))
            .count();
        let mark = if ctx.no_color
        {
            "✓".to_string()
        }
        else
        {
            "✓".green()
                .to_string()
        };
        eprintln!("{mark} Wrote {count} declarations to {}", path.display());
    }

    Ok(())
}

/// `typegen packages`: print the packages a run would convert.
pub fn packages_run(
    args: crate::cli::PackagesArgs,
    ctx: &AppContext,
) -> anyhow::Result<()>
{
    let cfg = load_config()?;
    let pkg_dir = args
        .pkg_dir
        .or_else(|| {
            cfg.generate
                .pkg_dir
                .clone()
        })
        .unwrap_or_default();
    let dir = resolve_pkg_dir(&pkg_dir)?;
    let pkg_path = args
        .pkg_path
        .or_else(|| {
            cfg.generate
                .pkg_path
                .clone()
        });
    let root = resolve_import_path(&dir, pkg_path.as_deref())?;

    let patterns: Vec<String> = cfg
        .ignore_patterns
        .iter()
        .chain(args.ignore.iter())
        .cloned()
        .collect();
    let walker = SourceWalker::new(&patterns)?.with_ignored_dirs(&cfg.ignored_dirs);
    let packages = discover_packages(&walker, &dir, &root)?;

    if args.json
    {
        let json = serde_json::to_string_pretty(&packages).context("Failed to serialize packages")?;
        println!("{json}");
        return Ok(());
    }

    let namer = DeclNamer::new(&root);
    for pkg in &packages
    {
        let prefix = namer.prefix(&pkg.import_path);
        let prefix = if prefix.is_empty() { "(none)".to_string() } else { prefix };
        if ctx.no_color
        {
            println!("{}  {}  {} files", pkg.import_path, prefix, pkg.files.len());
        }
        else
        {
            println!("{}  {}  {} files", pkg.import_path.bold(), prefix.cyan(), pkg.files.len());
        }
    }
    Ok(())
}
