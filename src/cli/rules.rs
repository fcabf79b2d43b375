use std::path::Path;

use comfy_table::{Cell, Table};

use crate::config::{load_config, save_config};
use crate::error::{CccError, Result};
use crate::models::{CategoryRule, KeyCode, QualificationTable};

pub fn list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let qualification = QualificationTable::from_raw(&config.qualification)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Pattern", "Key", "Qualified"]);
    for (i, rule) in config.rules.iter().enumerate() {
        let qualified = match rule.key.resolve().and_then(|k| qualification.lookup(k)) {
            Ok(true) => "yes",
            Ok(false) => "no",
            Err(_) => "?",
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.pattern),
            Cell::new(&rule.key),
            Cell::new(qualified),
        ]);
    }
    println!("Rules (last match wins)\n{table}");
    println!("Unmatched items get key {}", config.default_key);
    Ok(())
}

pub fn add(config_path: &Path, pattern: &str, key: KeyCode, qualified: Option<bool>) -> Result<()> {
    let mut config = load_config(config_path)?;
    let known = QualificationTable::from_raw(&config.qualification)?.contains(key);

    match qualified {
        Some(q) => {
            config
                .qualification
                .retain(|raw, _| raw.trim().parse::<KeyCode>().ok() != Some(key));
            config.qualification.insert(key.to_string(), q);
        }
        None if !known => {
            return Err(CccError::ConfigurationMismatch(format!(
                "key_code {key} has no entry in the qualification table; pass --qualified true|false"
            )));
        }
        None => {}
    }

    config.rules.push(CategoryRule::new(pattern, i64::from(key)));
    save_config(config_path, &config)?;
    println!("Added rule: '{pattern}' \u{2192} {key}");
    Ok(())
}
