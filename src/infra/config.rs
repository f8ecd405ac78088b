use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{AppContext, InitArgs},
    core::generate::Preset,
    infra::walk::DEFAULT_IGNORED_DIRS,
};

/// Config file names probed in the working directory, first match wins
pub const CONFIG_FILES: [&str; 4] = ["typegen.toml", "typegen.yaml", "typegen.json", ".typegen.toml"];

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Directory names never treated as packages
    pub ignored_dirs: Vec<String>,

    /// Extra root-relative globs to prune during discovery
    pub ignore_patterns: Vec<String>,

    /// Default generation settings
    pub generate: GenerateConfig,

    /// Named option bundles selectable with `--preset`
    pub presets: BTreeMap<String, Preset>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig
{
    pub pkg_dir: Option<PathBuf>,
    pub pkg_path: Option<String>,
    pub include: Option<String>,
    pub include_type: Option<String>,
    pub strip_prefix: bool,
    pub disable_rename: bool,
    pub out: Option<PathBuf>,
}

impl Default for Config
{
    fn default() -> Self
    {
        let mut presets = BTreeMap::new();
        presets.insert(
            "requests".to_string(),
            Preset {
                include: Some("(^|/)dto/".to_string()),
                include_type: Some("(Req|Res)$".to_string()),
                strip_prefix: false,
                disable_rename: false,
            },
        );

        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignore_patterns: Vec::new(),
            generate: GenerateConfig::default(),
            presets,
        }
    }
}

pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

/// Layer the first config file found in `dir` and `TYPEGEN__*` env vars
/// over the defaults.
pub fn load_config_from(dir: &Path) -> Result<Config>
{
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to seed default configuration")?;
    let mut builder = config::Config::builder().add_source(defaults);

    for name in &CONFIG_FILES
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    // e.g. TYPEGEN__GENERATE__PKG_DIR=./pkg
    builder = builder.add_source(
        config::Environment::with_prefix("TYPEGEN")
            .prefix_separator("__")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
