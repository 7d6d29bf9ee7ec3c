//! Configuration commands.

use std::path::{Path, PathBuf};

use anyhow::Context;

use govlinks::Config;

use crate::cli::icons::{dim_arrow, success};

/// Default file written by `config init`.
const DEFAULT_CONFIG_FILE: &str = "govlinks.toml";

/// Print the effective configuration.
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    if let Some(source) = &config.source_path {
        println!("# Loaded from {}", source.display());
    } else {
        println!("# Built-in defaults");
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Write the default configuration as TOML.
pub async fn cmd_config_init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let contents = Config::default().to_toml()?;
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    eprintln!("{} Wrote default configuration", success());
    eprintln!("  {} {}", dim_arrow(), path.display());
    Ok(())
}
