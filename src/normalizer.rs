use std::collections::BTreeMap;
use std::str::FromStr;

use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::{CccError, Result};
use crate::models::{CanonicalRow, Cell, PostingStatus, RawTable};

pub const DATE_TRANSACTED: &str = "date_transacted";
pub const DESCRIPTION: &str = "description";
pub const AMOUNT: &str = "amount";
pub const POSTING_DATE: &str = "posting_date";

const REQUIRED_COLUMNS: [&str; 3] = [DATE_TRANSACTED, DESCRIPTION, AMOUNT];

/// Label used for rule matching: the description up to its first double space.
pub fn derive_item(description: &str) -> String {
    description
        .split("  ")
        .next()
        .unwrap_or(description)
        .to_string()
}

/// Coerce an amount cell. Text accepts thousands separators, `$` and
/// accounting-style parentheses for negatives.
pub fn parse_amount(cell: &Cell) -> Result<Decimal> {
    match cell {
        Cell::Number(n) => Decimal::from_f64(*n)
            .map(|d| d.normalize())
            .ok_or_else(|| CccError::value_parsing(AMOUNT, n, "a decimal amount")),
        Cell::Text(raw) => {
            let s = raw.replace(&[',', '"', '$'][..], "");
            let s = s.trim();
            let (negate, digits) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
                Some(inner) => (true, inner.trim()),
                None => (false, s),
            };
            let value = Decimal::from_str(digits)
                .map_err(|_| CccError::value_parsing(AMOUNT, raw, "a decimal amount"))?;
            Ok(if negate { -value } else { value })
        }
        Cell::Empty => Err(CccError::value_parsing(AMOUNT, "", "a decimal amount")),
    }
}

fn status_of(cell: &Cell) -> PostingStatus {
    match cell {
        Cell::Text(s) if s.trim() == "PENDING" => PostingStatus::Pending,
        _ => PostingStatus::Posted,
    }
}

/// Drop noisy rows, rename columns to canonical names and derive `item`.
///
/// A row is kept only while its count of empty cells is strictly below
/// `null_threshold`. Columns absent from `column_map` keep their source name.
pub fn normalize(
    raw: &RawTable,
    column_map: &BTreeMap<String, String>,
    null_threshold: usize,
) -> Result<Vec<CanonicalRow>> {
    let headers: Vec<&str> = raw
        .headers
        .iter()
        .map(|h| column_map.get(h).map(String::as_str).unwrap_or(h))
        .collect();
    let find = |name: &str| headers.iter().position(|h| *h == name);

    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in REQUIRED_COLUMNS.into_iter().enumerate() {
        required[slot] = find(name).ok_or_else(|| {
            CccError::ConfigurationMismatch(format!(
                "required column '{name}' is missing after renaming (columns: {})",
                headers.join(", ")
            ))
        })?;
    }
    let [date_idx, desc_idx, amount_idx] = required;
    let posting_idx = find(POSTING_DATE);

    let mut rows = Vec::new();
    for position in 0..raw.rows.len() {
        let nulls = (0..headers.len())
            .filter(|&col| raw.cell(position, col).is_empty())
            .count();
        if nulls >= null_threshold {
            continue;
        }

        let description = match raw.cell(position, desc_idx) {
            Cell::Empty => return Err(CccError::value_parsing(DESCRIPTION, "", "text")),
            cell => cell.to_string(),
        };
        let amount = parse_amount(raw.cell(position, amount_idx))?;
        let posting_status = posting_idx
            .map(|idx| status_of(raw.cell(position, idx)))
            .unwrap_or(PostingStatus::Posted);
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(col, _)| {
                ![date_idx, desc_idx, amount_idx].contains(col) && Some(*col) != posting_idx
            })
            .map(|(col, name)| (name.to_string(), raw.cell(position, col).clone()))
            .collect();

        rows.push(CanonicalRow {
            position,
            date_raw: raw.cell(position, date_idx).clone(),
            item: derive_item(&description),
            description,
            amount,
            posting_status,
            extra,
        });
    }

    debug!(
        "normalized {} of {} rows (null threshold {null_threshold})",
        rows.len(),
        raw.rows.len()
    );
    Ok(rows)
}
