use std::path::Path;

use crate::config::load_config;
use crate::error::Result;

pub fn path(config_path: &Path) -> Result<()> {
    println!("{}", config_path.display());
    Ok(())
}

pub fn show(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    if !config_path.exists() {
        println!("# factory defaults; no file at {}", config_path.display());
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
