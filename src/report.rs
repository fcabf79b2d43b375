use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use log::warn;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::classifier::TransactionTable;
use crate::config::Config;
use crate::fmt::money;
use crate::models::{KeyCode, TransactionRow};

pub const WIDTH: usize = 84;

/// Title centered in a line of stars, WIDTH wide.
pub fn banner(title: &str) -> String {
    let used = title.chars().count() + 4;
    let left = WIDTH.saturating_sub(used) / 2;
    let right = WIDTH.saturating_sub(used) - left;
    format!("\n{}  {title}  {}\n", "*".repeat(left), "*".repeat(right))
}

const DEFAULT_COLUMNS: [&str; 5] = ["date_transacted", "posting_status", "item", "amount", "key_code"];

#[derive(Debug, Clone, PartialEq)]
enum Column {
    Date,
    Status,
    Description,
    Item,
    Amount,
    Key,
    Qualified,
    Extra(String),
}

impl Column {
    fn named(name: &str, extras: &[&str]) -> Option<Self> {
        Some(match name {
            "date_transacted" => Self::Date,
            "posting_status" => Self::Status,
            "description" => Self::Description,
            "item" => Self::Item,
            "amount" => Self::Amount,
            "key_code" => Self::Key,
            "qualified" => Self::Qualified,
            other if extras.contains(&other) => Self::Extra(other.to_string()),
            _ => return None,
        })
    }

    fn header(&self) -> &str {
        match self {
            Self::Date => "Date",
            Self::Status => "Status",
            Self::Description => "Description",
            Self::Item => "Item",
            Self::Amount => "Amount",
            Self::Key => "Key",
            Self::Qualified => "Qualified",
            Self::Extra(name) => name,
        }
    }

    fn cell(&self, row: &TransactionRow) -> Cell {
        match self {
            Self::Date => Cell::new(row.date_transacted.format("%Y-%m-%d")),
            Self::Status => Cell::new(row.posting_status),
            Self::Description => Cell::new(&row.description),
            Self::Item => Cell::new(&row.item),
            Self::Amount => Cell::new(money(row.amount)).set_alignment(CellAlignment::Right),
            Self::Key => Cell::new(row.key_code),
            Self::Qualified => Cell::new(if row.qualified { "yes" } else { "no" }),
            Self::Extra(name) => Cell::new(row.extra(name).map(ToString::to_string).unwrap_or_default()),
        }
    }
}

/// Resolve configured column names against what the table carries. Unknown
/// names are skipped with a warning; the key code is always shown.
fn display_columns(names: &[String], table: &TransactionTable) -> Vec<Column> {
    let extras: Vec<&str> = table
        .rows()
        .first()
        .map(|r| r.extra.iter().map(|(name, _)| name.as_str()).collect())
        .unwrap_or_default();
    let names: Vec<&str> = if names.is_empty() {
        DEFAULT_COLUMNS.to_vec()
    } else {
        names.iter().map(String::as_str).collect()
    };

    let mut columns = Vec::new();
    for name in names {
        match Column::named(name, &extras) {
            Some(col) if !columns.contains(&col) => columns.push(col),
            Some(_) => {}
            None => warn!("unknown display column '{name}' skipped"),
        }
    }
    if !columns.contains(&Column::Key) {
        columns.push(Column::Key);
    }
    columns
}

fn rows_table(rows: &[&TransactionRow], columns: &[Column]) -> Table {
    let mut table = Table::new();
    table.set_header(columns.iter().map(Column::header).collect::<Vec<_>>());
    for r in rows {
        table.add_row(columns.iter().map(|c| c.cell(r)).collect::<Vec<_>>());
    }
    table
}

fn section(title: &str, rows: &[&TransactionRow], subtotal: Decimal, columns: &[Column]) -> String {
    let mut out = banner(title);
    if rows.is_empty() {
        out.push_str("(no transactions)\n");
    } else {
        out.push_str(&format!("{}\n", rows_table(rows, columns)));
    }
    out.push_str(&format!("{}\n", "-".repeat(WIDTH)));
    out.push_str(&format!("Subtotal = {}\n", money(subtotal).bold()));
    out.push_str(&format!("{}\n", "*".repeat(WIDTH)));
    out
}

fn alert(label: &str, key: KeyCode, subtotal: Decimal, above: Decimal) -> String {
    let line = "!".repeat(WIDTH);
    let msg = format!("{label}: category {key} at {} (above {})", money(subtotal), money(above));
    format!("\n{}\n{}\n{}\n", line.red(), msg.red().bold(), line.red())
}

/// Text report: alerts, the qualified section, one section per configured
/// category, then the biggest purchases.
pub fn render_text(table: &TransactionTable, config: &Config) -> String {
    let columns = display_columns(&config.report.columns, table);
    let mut out = String::new();

    for a in &config.report.alerts {
        let subtotal = table.category_subtotal(a.key);
        if subtotal > a.above {
            out.push_str(&alert(&a.label, a.key, subtotal, a.above));
        }
    }

    out.push_str(&section(
        "QUALIFIED",
        &table.qualified_rows(&config.exclusions),
        table.qualified_subtotal(&config.exclusions),
        &columns,
    ));

    for &key in &config.report.categories {
        out.push_str(&section(
            &format!("CATEGORY {key}"),
            &table.category_rows(key),
            table.category_subtotal(key),
            &columns,
        ));
    }

    let top = table.top_purchases(config.top_n);
    let top_total: Decimal = top.iter().map(|r| r.amount).sum();
    out.push_str(&section("BIG PURCHASES", &top, top_total, &columns));
    out
}

pub fn render_empty(dropped: usize) -> String {
    format!("{}No transactions ({dropped} rows dropped as noise).\n", banner("EMPTY"))
}

#[derive(Debug, Serialize)]
pub struct CategoryTotal {
    pub key_code: KeyCode,
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub transactions: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub qualified_subtotal: Decimal,
    pub categories: Vec<CategoryTotal>,
    pub top_purchases: Vec<&'a TransactionRow>,
    pub rows: &'a [TransactionRow],
}

pub fn summary<'a>(table: &'a TransactionTable, config: &Config) -> Summary<'a> {
    let categories = table
        .key_codes()
        .into_iter()
        .map(|key_code| CategoryTotal {
            key_code,
            count: table.category_rows(key_code).len(),
            subtotal: table.category_subtotal(key_code),
        })
        .collect();
    Summary {
        transactions: table.len(),
        qualified_subtotal: table.qualified_subtotal(&config.exclusions),
        categories,
        top_purchases: table.top_purchases(config.top_n),
        rows: table.rows(),
    }
}
