use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CccError, Result};

/// Category identifier assigned by the rule table.
pub type KeyCode = u32;

/// A spreadsheet cell before any typing is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Blank or whitespace-only text is treated as a missing value.
    pub fn text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Empty => Ok(()),
        }
    }
}

/// Rows exactly as read from the statement sheet, banner rows already removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Short rows are padded with empty cells.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    Posted,
    Pending,
}

impl PostingStatus {
    /// Lowercase name, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posted => write!(f, "ok"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

/// Output of the normalizer: renamed, threshold-filtered, amount typed, date still raw.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    /// Index of the row in the source sheet, used to restore input order.
    pub position: usize,
    pub date_raw: Cell,
    pub description: String,
    pub item: String,
    pub amount: Decimal,
    pub posting_status: PostingStatus,
    /// Columns with no canonical meaning, passed through under their (possibly renamed) header.
    pub extra: Vec<(String, Cell)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    #[serde(skip)]
    pub position: usize,
    pub date_transacted: NaiveDate,
    pub posting_status: PostingStatus,
    pub description: String,
    pub item: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub key_code: KeyCode,
    pub qualified: bool,
    /// Source columns outside the canonical set, in sheet order.
    #[serde(skip)]
    pub extra: Vec<(String, Cell)>,
}

impl TransactionRow {
    pub fn extra(&self, name: &str) -> Option<&Cell> {
        self.extra.iter().find(|(n, _)| n == name).map(|(_, cell)| cell)
    }
}

/// A key code as written in the configuration: TOML allows either `3` or `"3"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawKey {
    Int(i64),
    Text(String),
}

impl RawKey {
    pub fn resolve(&self) -> Result<KeyCode> {
        match self {
            RawKey::Int(i) => KeyCode::try_from(*i)
                .map_err(|_| CccError::value_parsing("key_code", i, "a non-negative integer")),
            RawKey::Text(s) => s
                .trim()
                .parse::<KeyCode>()
                .map_err(|_| CccError::value_parsing("key_code", s, "a non-negative integer")),
        }
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawKey::Int(i) => write!(f, "{i}"),
            RawKey::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    pub key: RawKey,
}

impl CategoryRule {
    pub fn new(pattern: &str, key: i64) -> Self {
        Self {
            pattern: pattern.to_string(),
            key: RawKey::Int(key),
        }
    }
}

/// Key code to qualification flag. Every produced key must have an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualificationTable(BTreeMap<KeyCode, bool>);

impl QualificationTable {
    /// Build from the TOML form, where table keys are always strings.
    pub fn from_raw(raw: &BTreeMap<String, bool>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for (key, qualified) in raw {
            let code = RawKey::Text(key.clone()).resolve()?;
            table.insert(code, *qualified);
        }
        Ok(Self(table))
    }

    pub fn lookup(&self, key: KeyCode) -> Result<bool> {
        self.0.get(&key).copied().ok_or_else(|| {
            CccError::ConfigurationMismatch(format!(
                "key_code {key} has no entry in the qualification table"
            ))
        })
    }

    pub fn contains(&self, key: KeyCode) -> bool {
        self.0.contains_key(&key)
    }
}

impl FromIterator<(KeyCode, bool)> for QualificationTable {
    fn from_iter<I: IntoIterator<Item = (KeyCode, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_empty() {
        assert_eq!(Cell::text("   "), Cell::Empty);
        assert_eq!(Cell::text("GRAB"), Cell::Text("GRAB".to_string()));
    }

    #[test]
    fn test_cell_display_drops_integral_fraction() {
        assert_eq!(Cell::Number(45667.0).to_string(), "45667");
        assert_eq!(Cell::Number(12.5).to_string(), "12.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = RawTable {
            headers: vec!["a".into(), "b".into()],
            rows: vec![vec![Cell::Number(1.0)]],
        };
        assert_eq!(table.cell(0, 0), &Cell::Number(1.0));
        assert!(table.cell(0, 1).is_empty());
        assert!(table.cell(5, 0).is_empty());
    }

    #[test]
    fn test_raw_key_resolves_ints_and_numeric_strings() {
        assert_eq!(RawKey::Int(3).resolve().unwrap(), 3);
        assert_eq!(RawKey::Text(" 4 ".into()).resolve().unwrap(), 4);
    }

    #[test]
    fn test_raw_key_rejects_non_numeric() {
        let err = RawKey::Text("food".into()).resolve().unwrap_err();
        assert!(matches!(err, CccError::ValueParsing { ref field, ref value, .. }
            if field == "key_code" && value == "food"));
        assert!(RawKey::Int(-1).resolve().is_err());
    }

    #[test]
    fn test_qualification_lookup_missing_key_is_mismatch() {
        let table: QualificationTable = [(0, false), (1, true)].into_iter().collect();
        assert!(table.lookup(1).unwrap());
        assert!(matches!(
            table.lookup(9),
            Err(CccError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn test_qualification_from_raw_rejects_bad_key() {
        let mut raw = BTreeMap::new();
        raw.insert("x".to_string(), true);
        assert!(matches!(
            QualificationTable::from_raw(&raw),
            Err(CccError::ValueParsing { .. })
        ));
    }
}
