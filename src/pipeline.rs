use std::collections::BTreeMap;

use log::debug;

use crate::classifier::{classify_and_aggregate, TransactionTable};
use crate::error::Result;
use crate::models::{CategoryRule, KeyCode, QualificationTable, RawTable};
use crate::normalizer::normalize;

/// Everything the engine reads from configuration for one run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub column_map: BTreeMap<String, String>,
    pub null_threshold: usize,
    pub rules: Vec<CategoryRule>,
    pub qualification: QualificationTable,
    pub date_format: String,
    pub default_key: KeyCode,
}

#[derive(Debug)]
pub enum Outcome {
    /// Nothing survived threshold filtering.
    Empty { dropped: usize },
    Table(TransactionTable),
}

pub fn process(raw: &RawTable, config: &EngineConfig) -> Result<Outcome> {
    let rows = normalize(raw, &config.column_map, config.null_threshold)?;
    if rows.is_empty() {
        debug!("no rows left after normalizing {} raw rows", raw.rows.len());
        return Ok(Outcome::Empty {
            dropped: raw.rows.len(),
        });
    }
    let table = classify_and_aggregate(
        &rows,
        &config.rules,
        &config.qualification,
        &config.date_format,
        config.default_key,
    )?;
    Ok(Outcome::Table(table))
}
