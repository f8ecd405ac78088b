//! Domain error taxonomy for the generation pipeline.
//!
//! Configuration and pattern errors are raised before any work starts,
//! walk/parse errors abort a run, conversion errors are recovered per
//! package, and output errors surface only after generation succeeded.

use std::path::PathBuf;

use miette::Diagnostic;

/// Result alias used by the library stages
pub type Result<T, E = TypegenError> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum TypegenError
{
    /// Missing or unusable inputs (pkg dir, module path, preset)
    #[error("configuration error: {0}")]
    #[diagnostic(code(typegen::config), help("run `typegen generate --help` for the accepted flags"))]
    Configuration(String),

    /// A filter pattern that does not compile
    #[error("invalid {flag} pattern `{pattern}`")]
    #[diagnostic(code(typegen::pattern), help("patterns use Rust `regex` syntax; pass an empty string to disable"))]
    InvalidPattern
    {
        flag: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Reading a file or directory failed
    #[error("i/o error at {}", path.display())]
    #[diagnostic(code(typegen::io))]
    Io
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk could not read an entry
    #[error("failed to walk {}", root.display())]
    #[diagnostic(code(typegen::walk))]
    Walk
    {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// A Go source file could not be parsed while classifying interfaces
    #[error("failed to parse {}: {reason}", path.display())]
    #[diagnostic(
        code(typegen::parse),
        help("interface classification must see every file; fix the syntax error and re-run")
    )]
    Parse
    {
        path: PathBuf, reason: String
    },

    /// A single package could not be converted (recovered by skipping it)
    #[error("failed to convert package {package}: {reason}")]
    #[diagnostic(code(typegen::conversion))]
    Conversion
    {
        package: String, reason: String
    },

    /// The destination could not be created or written
    #[error("failed to write output {}", path.display())]
    #[diagnostic(code(typegen::output), help("generation succeeded; retry with another --out path or --stdout"))]
    Output
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TypegenError
{
    /// Shorthand for configuration failures
    pub fn config(msg: impl Into<String>) -> Self
    {
        Self::Configuration(msg.into())
    }

    /// Wrap an I/O failure with the path it happened at
    pub fn io(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self
    {
        Self::Io { path: path.into(), source }
    }

    /// Whether the pipeline may continue past this error
    pub fn is_recoverable(&self) -> bool
    {
        matches!(self, Self::Conversion { .. })
    }
}
