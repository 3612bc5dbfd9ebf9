use crate::config::{PulsemapConfig, CONFIG_FILE_NAME};
use crate::io;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_HEADER: &str = "# Pulsemap Configuration\n#\n# Every value below is the built-in default; delete the ones you do not change.\n\n";

pub fn init_config(force: bool) -> Result<()> {
    let path = init_config_at(Path::new("."), force)?;
    println!("Created {} configuration file", path.display());
    Ok(())
}

/// Write the default configuration into `dir`, returning the file's path.
pub fn init_config_at(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let body = toml::to_string_pretty(&PulsemapConfig::default())
        .context("Failed to render default configuration")?;

    io::write_file(&config_path, &format!("{CONFIG_HEADER}{body}"))?;
    log::info!("Wrote default configuration to {}", config_path.display());

    Ok(config_path)
}
