use std::path::Path;

use log::info;

use crate::classifier::TransactionTable;
use crate::error::Result;
use crate::models::TransactionRow;

const FIXED_COLUMNS: [&str; 7] = [
    "date_transacted",
    "posting_status",
    "key_code",
    "qualified",
    "item",
    "description",
    "amount",
];

fn record(row: &TransactionRow, extra_names: &[&str]) -> Vec<String> {
    let mut out = vec![
        row.date_transacted.format("%Y-%m-%d").to_string(),
        row.posting_status.as_str().to_string(),
        row.key_code.to_string(),
        row.qualified.to_string(),
        row.item.clone(),
        row.description.clone(),
        row.amount.to_string(),
    ];
    out.extend(
        extra_names
            .iter()
            .map(|name| row.extra(name).map(ToString::to_string).unwrap_or_default()),
    );
    out
}

/// Write every classified row to `path` as CSV, in statement order. Source
/// columns outside the canonical set follow the fixed columns.
pub fn write_csv(table: &TransactionTable, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let extra_names: Vec<&str> = table
        .rows()
        .first()
        .map(|r| r.extra.iter().map(|(name, _)| name.as_str()).collect())
        .unwrap_or_default();

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(FIXED_COLUMNS.iter().copied().chain(extra_names.iter().copied()))?;
    for row in table.rows() {
        wtr.write_record(record(row, &extra_names))?;
    }
    wtr.flush()?;
    info!("exported {} rows to {}", table.len(), path.display());
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::classifier::classify_and_aggregate;
    use crate::models::{CanonicalRow, CategoryRule, Cell, PostingStatus, QualificationTable};

    fn table() -> TransactionTable {
        let rows = vec![
            CanonicalRow {
                position: 0,
                date_raw: Cell::Text("03 Feb 2023".to_string()),
                description: "GRAB*FOOD  SINGAPORE SG".to_string(),
                item: "GRAB*FOOD".to_string(),
                amount: Decimal::new(1230, 2),
                posting_status: PostingStatus::Pending,
                extra: vec![
                    ("Card No.".to_string(), Cell::Number(1234.0)),
                    ("Ref".to_string(), Cell::Text("A1".to_string())),
                ],
            },
            CanonicalRow {
                position: 1,
                date_raw: Cell::Text("04 Feb 2023".to_string()),
                description: "SHOPEE, SINGAPORE".to_string(),
                item: "SHOPEE, SINGAPORE".to_string(),
                amount: Decimal::new(-500, 2),
                posting_status: PostingStatus::Posted,
                extra: vec![
                    ("Card No.".to_string(), Cell::Number(1234.0)),
                    ("Ref".to_string(), Cell::Empty),
                ],
            },
        ];
        let qualification: QualificationTable = [(0, false), (1, true), (5, true)].into_iter().collect();
        classify_and_aggregate(
            &rows,
            &[CategoryRule::new("GRAB", 0), CategoryRule::new("SHOPEE", 5)],
            &qualification,
            "%d %b %Y",
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("classified.csv");
        let n = write_csv(&table(), &path).unwrap();
        assert_eq!(n, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "date_transacted,posting_status,key_code,qualified,item,description,amount,Card No.,Ref"
        );
        assert_eq!(
            lines[1],
            "2023-02-03,pending,0,false,GRAB*FOOD,GRAB*FOOD  SINGAPORE SG,12.30,1234,A1"
        );
        assert_eq!(
            lines[2],
            "2023-02-04,posted,5,true,\"SHOPEE, SINGAPORE\",\"SHOPEE, SINGAPORE\",-5.00,1234,"
        );
    }
}
