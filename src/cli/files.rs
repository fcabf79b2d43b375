use std::path::{Path, PathBuf};

use comfy_table::{Cell, Table};

use crate::config::load_config;
use crate::error::Result;
use crate::locator::file_table;

pub fn run(config_path: &Path, dir: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let dir = dir.unwrap_or_else(|| config.statement_dir());
    let files = file_table(&dir, &config.statement.pattern)?;
    if files.is_empty() {
        println!(
            "No files matching '{}' in {}",
            config.statement.pattern,
            dir.display()
        );
        return Ok(());
    }

    let last = files.len() - 1;
    let mut table = Table::new();
    table.set_header(vec!["#", "Modified", "File", ""]);
    for (i, f) in files.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(f.modified.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(f.file_name()),
            Cell::new(if i == last { "latest" } else { "" }),
        ]);
    }
    println!("Statements in {}\n{table}", dir.display());
    Ok(())
}
