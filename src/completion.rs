//! Shell completions for `typegen`.
//!
//! Scripts cover every subcommand, so `typegen generate --pre<TAB>` also
//! completes `--preset`. Preset names live in the config file and are not
//! completed.

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate, generate_to};
use owo_colors::OwoColorize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::cli::{AppContext, Cli, CompletionsArgs, Shell};

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
            Shell::Elvish => CompletionShell::Elvish,
        }
    }
}

/// Write the completion script for `shell` into `dir`, returning its path
pub fn write_to_dir(shell: Shell, dir: &Path) -> Result<PathBuf> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();

    fs::create_dir_all(dir).with_context(|| format!("create completion dir {}", dir.display()))?;
    generate_to(CompletionShell::from(shell), &mut cmd, bin, dir).context("generate completion file")
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    if args.stdout {
        let mut cmd = Cli::command();
        let bin = cmd.get_name().to_string();
        generate(CompletionShell::from(args.shell), &mut cmd, bin, &mut io::stdout());
        return Ok(());
    }

    let dir = args
        .out_dir
        .ok_or_else(|| anyhow::anyhow!("--out-dir is required unless --stdout is set"))?;
    let path = write_to_dir(args.shell.clone(), &dir)?;

    if !ctx.quiet {
        let mark = if ctx.no_color { "✓".to_string() } else { "✓".green().to_string() };
        eprintln!("{mark} Wrote {:?} completions to {}", args.shell, path.display());
    }
    Ok(())
}
