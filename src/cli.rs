use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub verbose: bool,  // global --verbose
}

#[derive(Parser)]
#[command(name = "typegen")]
#[command(about = "Generate TypeScript declarations from Go types, narrowed to what you ask for")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress status output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log pipeline stages to stderr (TYPEGEN_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a declaration file from a Go source tree
    Generate(GenerateArgs),

    /// List the Go packages a generation run would convert
    Packages(PackagesArgs),

    /// Initialize a typegen.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Default, Parser)]
pub struct GenerateArgs {
    /// Root Go source directory (falls back to [generate].pkg_dir)
    #[arg(long)]
    pub pkg_dir: Option<PathBuf>,

    /// Root import path; read from go.mod when omitted
    #[arg(long)]
    pub pkg_path: Option<String>,

    /// Regex on each declaration's origin file (root-relative)
    #[arg(long, visible_alias = "include-file")]
    pub include: Option<String>,

    /// Regex on each declaration's emitted name
    #[arg(long)]
    pub include_type: Option<String>,

    /// Emit bare Go names instead of package-prefixed ones
    #[arg(long)]
    pub strip_prefix: bool,

    /// Ignore any configured rename mapping
    #[arg(long)]
    pub disable_rename: bool,

    /// Output file ("-" for stdout); defaults to index.d.ts next to the binary
    #[arg(short, long, visible_alias = "out-file")]
    pub out: Option<PathBuf>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Apply a named preset from the config file
    #[arg(long)]
    pub preset: Option<String>,

    /// Additional glob patterns to prune (root-relative directories)
    #[arg(short, long)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Default, Parser)]
pub struct PackagesArgs {
    /// Root Go source directory (falls back to [generate].pkg_dir)
    #[arg(long)]
    pub pkg_dir: Option<PathBuf>,

    /// Root import path; read from go.mod when omitted
    #[arg(long)]
    pub pkg_path: Option<String>,

    /// Additional glob patterns to prune (root-relative directories)
    #[arg(short, long)]
    pub ignore: Vec<String>,

    /// Emit JSON instead of human text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
