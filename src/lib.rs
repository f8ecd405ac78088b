//! **typegen** - Go structs to TypeScript declarations, narrowed by whitelist
//!
//! Converts a Go source tree into a single `.d.ts` style file, then keeps only
//! the declarations a caller asks for plus everything they transitively
//! reference. Interface-only Go types never reach the output.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Domain error taxonomy with miette diagnostics
pub mod error;

/// Core pipeline - discovery, classification, conversion and block shaping
pub mod core {
    /// Declaration blocks anchored by `// From <origin>` markers
    pub mod blocks;
    pub use blocks::{DeclarationBlock, Declarations};

    /// Interface-only type names collected straight from Go sources
    pub mod classify;

    /// First-wins removal of repeated declarations
    pub mod dedup;

    /// Package discovery below the root directory
    pub mod discover;
    pub use discover::PackageDescriptor;

    /// Conversion engine trait and the built-in tree-sitter engine
    pub mod engine;
    pub use engine::{ConversionEngine, GoConverter};

    /// Drops interface-only declarations
    pub mod filter;

    /// Options, presets and the end-to-end pipeline
    pub mod generate;
    pub use generate::{Options, Preset, generate_types, generate_types_to_output, run as generate_run};

    /// Identifier-level reference graph between blocks
    pub mod graph;

    /// Package prefixes and emitted-name computation
    pub mod prefix;

    /// Whitelist selection and breadth-first dependency closure
    pub mod select;
}

/// Language processing - Go parsing and TypeScript emission via tree-sitter
pub mod parsers {
    /// Go source model (imports, types, constants)
    pub mod go_parser;
    pub use go_parser::GoParser;

    /// TypeScript block emitter for parsed Go declarations
    pub mod ts_emitter;
}

/// Infrastructure - Configuration, I/O, walking and logging
pub mod infra {
    /// Layered configuration (file + env) with TOML init
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// `go.mod` lookup and root import path resolution
    pub mod gomod;

    /// Memory-mapped reads for large files and output destinations
    pub mod io;
    pub use io::{FileContent, OutputTarget, read_file_smart, write_output};

    /// tracing-subscriber setup
    pub mod logging;

    /// Go package directory walking with pruning
    pub mod walk;
    pub use walk::SourceWalker;

    /// Tree-sitter node helpers
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use crate::core::generate::packages_run;
pub use crate::core::{generate_run, generate_types, generate_types_to_output};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use crate::core::prefix::TypeNameMapper;
pub use crate::core::{ConversionEngine, DeclarationBlock, Declarations, Options, PackageDescriptor, Preset};
pub use error::{Result, TypegenError};
