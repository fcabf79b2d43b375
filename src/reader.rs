use std::path::Path;

use log::debug;

use crate::error::{CccError, Result};
use crate::models::{Cell, RawTable};

/// pandas-style name for a blank header cell.
fn header_name(cell: &Cell, col: usize) -> String {
    match cell {
        Cell::Empty => format!("Unnamed: {col}"),
        other => other.to_string().trim().to_string(),
    }
}

fn into_table<I>(mut rows: I) -> RawTable
where
    I: Iterator<Item = Vec<Cell>>,
{
    let Some(header) = rows.next() else {
        return RawTable::default();
    };
    let headers = header
        .iter()
        .enumerate()
        .map(|(col, cell)| header_name(cell, col))
        .collect();
    RawTable {
        headers,
        rows: rows.collect(),
    }
}

/// Read a statement into a raw table. The first `skip_rows` rows are banner
/// text; the row after them is the header.
pub fn read_statement(path: &Path, skip_rows: usize, sheet: Option<&str>) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = match ext.as_str() {
        "csv" => read_csv(path, skip_rows)?,
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => read_workbook(path, skip_rows, sheet)?,
        _ => {
            return Err(CccError::Other(format!(
                "Unsupported statement format: {}",
                path.display()
            )))
        }
    };
    debug!(
        "read {} rows x {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv(path: &Path, skip_rows: usize) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut rows = Vec::new();
    for result in rdr.records().skip(skip_rows) {
        let record = result?;
        rows.push(record.iter().map(Cell::text).collect::<Vec<_>>());
    }
    Ok(into_table(rows.into_iter()))
}

// ---------------------------------------------------------------------------
// Workbooks (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "excel")]
fn to_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::String(s) => Cell::text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s),
        _ => Cell::Empty,
    }
}

#[cfg(feature = "excel")]
fn read_workbook(path: &Path, skip_rows: usize, sheet: Option<&str>) -> Result<RawTable> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| CccError::Workbook(format!("Failed to open {}: {e}", path.display())))?;
    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CccError::Workbook(format!("{} has no sheets", path.display())))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| CccError::Workbook(format!("Failed to read sheet '{name}': {e}")))?;
    Ok(range_table(&range, skip_rows))
}

#[cfg(feature = "excel")]
fn range_table(range: &calamine::Range<calamine::Data>, skip_rows: usize) -> RawTable {
    // The range starts at the first used cell, not necessarily row 0
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = skip_rows.saturating_sub(first_row);
    let rows = range
        .rows()
        .skip(skip)
        .map(|row| row.iter().map(to_cell).collect::<Vec<_>>());
    into_table(rows)
}

#[cfg(not(feature = "excel"))]
fn read_workbook(path: &Path, _skip_rows: usize, _sheet: Option<&str>) -> Result<RawTable> {
    Err(CccError::Workbook(format!(
        "Reading {} requires the 'excel' feature; build with `cargo build --features excel`",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_csv_skips_banner_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "stmt.csv",
            "\
United Overseas Bank
Card Number:,1234
Transaction Date,Description,Transaction Amount(Local)
03 Feb 2023,GRAB*FOOD  SINGAPORE,12.30
04 Feb 2023,BUS/MRT 123,,
",
        );
        let table = read_statement(&path, 2, None).unwrap();
        assert_eq!(
            table.headers,
            vec!["Transaction Date", "Description", "Transaction Amount(Local)"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 2), &Cell::Text("12.30".to_string()));
        assert!(table.cell(1, 2).is_empty());
        assert!(table.cell(1, 3).is_empty());
    }

    #[test]
    fn test_blank_header_named_like_pandas() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "stmt.csv", "Date,,Amount\n03 Feb 2023,x,1\n");
        let table = read_statement(&path, 0, None).unwrap();
        assert_eq!(table.headers, vec!["Date", "Unnamed: 1", "Amount"]);
    }

    #[test]
    fn test_empty_file_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "stmt.csv", "banner\n");
        let table = read_statement(&path, 1, None).unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "stmt.pdf", "");
        assert!(matches!(
            read_statement(&path, 0, None),
            Err(CccError::Other(_))
        ));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_to_cell_maps_every_variant() {
        use calamine::{CellErrorType, Data, ExcelDateTime, ExcelDateTimeType};

        assert_eq!(to_cell(&Data::String("GRAB".into())), Cell::Text("GRAB".into()));
        assert_eq!(to_cell(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(to_cell(&Data::Float(12.3)), Cell::Number(12.3));
        assert_eq!(to_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(to_cell(&Data::Bool(true)), Cell::Text("true".into()));
        let dt = ExcelDateTime::new(45667.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(to_cell(&Data::DateTime(dt)), Cell::Number(45667.0));
        assert_eq!(
            to_cell(&Data::DateTimeIso("2025-01-10T00:00:00".into())),
            Cell::Text("2025-01-10T00:00:00".into())
        );
        assert_eq!(to_cell(&Data::DurationIso("PT1H".into())), Cell::Text("PT1H".into()));
        assert_eq!(to_cell(&Data::Error(CellErrorType::Div0)), Cell::Empty);
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
    }

    #[cfg(feature = "excel")]
    fn statement_range() -> calamine::Range<calamine::Data> {
        use calamine::{Data, ExcelDateTime, ExcelDateTimeType};

        // rows 0 and 1 are blank, so the used range starts at row 2
        let mut range = calamine::Range::new((2, 0), (5, 2));
        range.set_value((2, 0), Data::String("United Overseas Bank".into()));
        range.set_value((3, 0), Data::String("Transaction Date".into()));
        range.set_value((3, 1), Data::String("Description".into()));
        range.set_value((3, 2), Data::String("Transaction Amount(Local)".into()));
        let dt = ExcelDateTime::new(45667.0, ExcelDateTimeType::DateTime, false);
        range.set_value((4, 0), Data::DateTime(dt));
        range.set_value((4, 1), Data::String("GRAB*FOOD  SINGAPORE".into()));
        range.set_value((4, 2), Data::Float(12.3));
        range
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_range_skip_counts_from_sheet_top() {
        let table = range_table(&statement_range(), 3);
        assert_eq!(
            table.headers,
            vec!["Transaction Date", "Description", "Transaction Amount(Local)"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 0), &Cell::Number(45667.0));
        assert_eq!(table.cell(0, 2), &Cell::Number(12.3));
        assert!(table.cell(1, 0).is_empty());
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_range_skip_inside_leading_blank_rows() {
        let table = range_table(&statement_range(), 1);
        assert_eq!(table.headers, vec!["United Overseas Bank", "Unnamed: 1", "Unnamed: 2"]);
        assert_eq!(table.rows.len(), 3);
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_workbook_dates_parse_as_serials() {
        use crate::classifier::parse_date;

        let table = range_table(&statement_range(), 3);
        assert_eq!(
            parse_date(table.cell(0, 0), "%d %b %Y").unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        );
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_corrupt_workbook_is_workbook_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "CC_TXN_History_1.xls", "not a workbook");
        assert!(matches!(
            read_statement(&path, 9, None),
            Err(CccError::Workbook(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_statement(&dir.path().join("nope.csv"), 0, None),
            Err(CccError::Io(_))
        ));
    }
}
