use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{CccError, Result};
use crate::models::{
    CanonicalRow, CategoryRule, Cell, KeyCode, QualificationTable, TransactionRow,
};
use crate::normalizer::DATE_TRANSACTED;

/// Case-sensitive, unanchored containment against the row's `item`.
fn matches(item: &str, pattern: &str) -> bool {
    item.contains(pattern)
}

/// Rules apply in declaration order and a later match overrides an earlier
/// one, so the winner is the last declared rule that matches.
fn match_rule(item: &str, rules: &[(&str, KeyCode)]) -> Option<KeyCode> {
    rules
        .iter()
        .rev()
        .find(|(pattern, _)| matches(item, pattern))
        .map(|(_, key)| *key)
}

#[cfg(any(feature = "excel", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    // float to int casts saturate; try_days rejects what overflows
    base.checked_add_signed(chrono::Duration::try_days(serial.trunc() as i64)?)
}

pub fn parse_date(cell: &Cell, date_format: &str) -> Result<NaiveDate> {
    let expected = || format!("a date in format '{date_format}'");
    match cell {
        Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), date_format)
            .map_err(|_| CccError::value_parsing(DATE_TRANSACTED, s, &expected())),
        #[cfg(feature = "excel")]
        Cell::Number(n) => excel_serial_to_date(*n)
            .ok_or_else(|| CccError::value_parsing(DATE_TRANSACTED, n, &expected())),
        #[cfg(not(feature = "excel"))]
        Cell::Number(n) => Err(CccError::value_parsing(DATE_TRANSACTED, n, &expected())),
        Cell::Empty => Err(CccError::value_parsing(DATE_TRANSACTED, "", &expected())),
    }
}

/// Tag every row with a category key, collapse duplicate descriptions and
/// resolve qualification.
///
/// Of several rows sharing a description only the last one survives. Rows no
/// rule matches take `default_key`. The result keeps input order.
pub fn classify_and_aggregate(
    rows: &[CanonicalRow],
    rules: &[CategoryRule],
    qualification: &QualificationTable,
    date_format: &str,
    default_key: KeyCode,
) -> Result<TransactionTable> {
    let rules: Vec<(&str, KeyCode)> = rules
        .iter()
        .map(|rule| rule.key.resolve().map(|key| (rule.pattern.as_str(), key)))
        .collect::<Result<_>>()?;

    let mut last_seen: HashMap<&str, usize> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        last_seen.insert(row.description.as_str(), idx);
    }

    let mut out = Vec::with_capacity(last_seen.len());
    let mut uncategorized = 0usize;
    for (idx, row) in rows.iter().enumerate() {
        if last_seen.get(row.description.as_str()) != Some(&idx) {
            debug!("dropping duplicate description '{}'", row.description);
            continue;
        }
        let key_code = match match_rule(&row.item, &rules) {
            Some(key) => key,
            None => {
                uncategorized += 1;
                default_key
            }
        };
        out.push(TransactionRow {
            position: row.position,
            date_transacted: parse_date(&row.date_raw, date_format)?,
            posting_status: row.posting_status,
            description: row.description.clone(),
            item: row.item.clone(),
            amount: row.amount,
            key_code,
            qualified: qualification.lookup(key_code)?,
            extra: row.extra.clone(),
        });
    }
    out.sort_by_key(|r| r.position);

    debug!(
        "classified {} rows ({} duplicates dropped, {uncategorized} uncategorized)",
        out.len(),
        rows.len() - out.len()
    );
    Ok(TransactionTable { rows: out })
}

/// Finished, read-only table handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionTable {
    rows: Vec<TransactionRow>,
}

impl TransactionTable {
    pub fn rows(&self) -> &[TransactionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn qualified_rows(&self, exclusions: &BTreeSet<String>) -> Vec<&TransactionRow> {
        self.rows
            .iter()
            .filter(|r| r.qualified && !exclusions.contains(&r.item))
            .collect()
    }

    pub fn qualified_subtotal(&self, exclusions: &BTreeSet<String>) -> Decimal {
        self.qualified_rows(exclusions).iter().map(|r| r.amount).sum()
    }

    pub fn category_rows(&self, key_code: KeyCode) -> Vec<&TransactionRow> {
        self.rows.iter().filter(|r| r.key_code == key_code).collect()
    }

    pub fn category_subtotal(&self, key_code: KeyCode) -> Decimal {
        self.category_rows(key_code).iter().map(|r| r.amount).sum()
    }

    /// Largest positive amounts first; equal amounts stay in input order.
    pub fn top_purchases(&self, n: usize) -> Vec<&TransactionRow> {
        let mut rows: Vec<&TransactionRow> = self
            .rows
            .iter()
            .filter(|r| r.amount > Decimal::ZERO)
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount));
        rows.truncate(n);
        rows
    }

    /// Distinct key codes present, ascending.
    pub fn key_codes(&self) -> BTreeSet<KeyCode> {
        self.rows.iter().map(|r| r.key_code).collect()
    }
}
