use std::path::Path;

use crate::data::parser;
use crate::error::{MarginalError, Result};

/// Rows scanned when looking for the header.
const HEADER_SCAN_ROWS: usize = 50;
/// Rows sampled when deciding whether a column is numeric.
const NUMERIC_SAMPLE_ROWS: usize = 100;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "tsv", "xls", "xlsx"];

/// Posterior draws loaded from a trace file: one column per parameter.
#[derive(Debug, Clone)]
pub struct TraceTable {
    pub columns: Vec<String>,
    /// Column-major values; unparseable cells become NaN.
    pub values: Vec<Vec<f64>>,
    /// Indices of columns that are mostly numeric.
    pub numeric: Vec<usize>,
    pub row_count: usize,
}

impl TraceTable {
    /// Build from raw rows, locating the header first.
    pub fn from_rows(all_rows: Vec<Vec<String>>) -> Result<Self> {
        let header_row = parser::detect_header_row(&all_rows, HEADER_SCAN_ROWS);
        if all_rows.is_empty() || header_row >= all_rows.len() {
            return Err(MarginalError::NoData);
        }

        let columns: Vec<String> = all_rows[header_row]
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
        let data_rows = &all_rows[header_row + 1..];
        if data_rows.is_empty() {
            return Err(MarginalError::NoData);
        }

        let mut column_data: Vec<Vec<String>> = vec![Vec::with_capacity(data_rows.len()); columns.len()];
        for row in data_rows {
            for (col_idx, col) in column_data.iter_mut().enumerate() {
                col.push(row.get(col_idx).cloned().unwrap_or_default());
            }
        }

        let numeric = parser::numeric_columns(&column_data, NUMERIC_SAMPLE_ROWS);
        let values = column_data.iter().map(|c| column_to_f64(c)).collect();

        Ok(Self {
            columns,
            values,
            numeric,
            row_count: data_rows.len(),
        })
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
            .ok_or_else(|| MarginalError::ColumnNotFound(name.to_string()))
    }

    /// Named columns in the requested order; all numeric columns when `names` is empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<(String, Vec<f64>)>> {
        if names.is_empty() {
            return Ok(self
                .numeric
                .iter()
                .map(|&i| (self.columns[i].clone(), self.values[i].clone()))
                .collect());
        }
        names
            .iter()
            .map(|n| Ok((n.clone(), self.column(n)?.to_vec())))
            .collect()
    }
}

/// Load a CSV, TSV or Excel trace file.
pub fn load_file(path: &Path) -> Result<TraceTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" => read_delimited(path, b',')?,
        "tsv" => read_delimited(path, b'\t')?,
        "xls" | "xlsx" => read_excel(path)?,
        _ => return Err(MarginalError::UnsupportedFormat(ext)),
    };
    let table = TraceTable::from_rows(rows)?;
    tracing::info!(
        path = %path.display(),
        columns = table.columns.len(),
        draws = table.row_count,
        "loaded trace"
    );
    Ok(table)
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read(path)?;
    // Non-UTF-8 files are read as latin1.
    let text = match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(record.iter().map(|s| s.to_string()).collect()),
            Err(e) => tracing::debug!("skipping malformed row: {e}"),
        }
    }
    Ok(rows)
}

fn read_excel(path: &Path) -> Result<Vec<Vec<String>>> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| MarginalError::Workbook(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| MarginalError::Workbook("no sheets found".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| MarginalError::Workbook(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect())
}

/// Parse a string column; unparseable cells become NaN.
pub fn column_to_f64(data: &[String]) -> Vec<f64> {
    data.iter()
        .map(|s| s.trim().parse::<f64>().unwrap_or(f64::NAN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_csv_trace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        fs::write(&path, "mu,sigma,chain\n0.1,1.0,a\n0.2,1.5,a\n0.3,,b\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["mu", "sigma", "chain"]);
        assert_eq!(table.row_count, 3);
        assert_eq!(table.numeric, vec![0, 1]);
        assert_eq!(table.column("mu").unwrap(), &[0.1, 0.2, 0.3]);
        assert!(table.column("sigma").unwrap()[2].is_nan());
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        fs::write(&path, "# adaptation info\n# step size 0.3\nlp__,theta\n-7.1,0.2\n-6.9,0.4\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["lp__", "theta"]);
        assert_eq!(table.row_count, 2);
    }

    #[test]
    fn test_load_tsv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.tsv");
        fs::write(&path, "a\tb\n1\t2\n3\t4\n").unwrap();
        let table = load_file(&path).unwrap();
        assert_eq!(table.column("b").unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.parquet");
        fs::write(&path, "").unwrap();
        assert!(matches!(load_file(&path), Err(MarginalError::UnsupportedFormat(e)) if e == "parquet"));
        assert!(!is_supported(&path));
        assert!(is_supported(Path::new("x.CSV")));
    }

    #[test]
    fn test_header_only_is_no_data() {
        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        assert!(matches!(TraceTable::from_rows(rows), Err(MarginalError::NoData)));
    }

    #[test]
    fn test_select_columns() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["1".to_string(), "x".to_string(), "3".to_string()],
        ];
        let table = TraceTable::from_rows(rows).unwrap();
        let all = table.select(&[]).unwrap();
        assert_eq!(all.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
        let picked = table.select(&["c".to_string()]).unwrap();
        assert_eq!(picked[0].1, vec![3.0]);
        assert!(matches!(
            table.select(&["zzz".to_string()]),
            Err(MarginalError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_column_to_f64() {
        let data = vec!["1.5".to_string(), "abc".to_string(), " 2 ".to_string(), "inf".to_string()];
        let vals = column_to_f64(&data);
        assert_eq!(vals[0], 1.5);
        assert!(vals[1].is_nan());
        assert_eq!(vals[2], 2.0);
        assert!(vals[3].is_infinite());
    }
}
