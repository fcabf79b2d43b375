use std::path::Path;

use crate::config::reset_config;
use crate::error::Result;

pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        println!(
            "Config already exists at {}. Use --force to reset it to factory defaults.",
            config_path.display()
        );
        return Ok(());
    }
    if let Some(backup) = reset_config(config_path)? {
        println!("Backed up previous config to {}", backup.display());
    }
    println!("Wrote factory config to {}", config_path.display());
    Ok(())
}
