use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use log::info;

use crate::cli::ReportArgs;
use crate::config::{load_config, Config};
use crate::error::Result;
use crate::export::write_csv;
use crate::locator::latest_statement;
use crate::pipeline::{process, Outcome};
use crate::reader::read_statement;
use crate::report::{render_empty, render_text, summary};

fn statement_path(config: &Config, args: &ReportArgs) -> Result<PathBuf> {
    if let Some(file) = &args.file {
        return Ok(file.clone());
    }
    let dir = args.dir.clone().unwrap_or_else(|| config.statement_dir());
    let latest = latest_statement(&dir, &config.statement.pattern)?;
    Ok(latest.path)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, text)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

pub fn run(config_path: &Path, args: ReportArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let path = statement_path(&config, &args)?;
    info!("processing {}", path.display());

    let raw = read_statement(&path, config.statement.skip_rows, config.statement.sheet.as_deref())?;
    let engine = config.engine()?;

    // Files get plain text; so does a piped stdout.
    if args.output.is_some() || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let table = match process(&raw, &engine)? {
        Outcome::Table(table) => table,
        Outcome::Empty { dropped } => {
            if args.json {
                let empty = serde_json::json!({ "transactions": 0, "dropped": dropped });
                println!("{}", serde_json::to_string_pretty(&empty)?);
                return Ok(());
            }
            return emit(&render_empty(dropped), args.output.as_deref());
        }
    };

    if let Some(csv_path) = &args.export {
        let n = write_csv(&table, csv_path)?;
        println!("Exported {n} rows to {}", csv_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary(&table, &config))?);
        return Ok(());
    }
    emit(&render_text(&table, &config), args.output.as_deref())
}
