use std::collections::HashMap;

/// Index of the header row among the first rows of a table.
///
/// Trace exports often start with sampler metadata, so the header is the
/// last row (scanning the first `max_rows`) whose cells are all non-empty,
/// non-numeric text and whose width matches the table's dominant width.
/// Falls back to row 0.
pub fn detect_header_row(rows: &[Vec<String>], max_rows: usize) -> usize {
    let rows = &rows[..rows.len().min(max_rows)];
    if rows.is_empty() {
        return 0;
    }

    let mut widths: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *widths.entry(used_width(row)).or_insert(0) += 1;
    }
    let dominant = widths
        .into_iter()
        .max_by_key(|&(width, count)| (count, width))
        .map(|(width, _)| width)
        .unwrap_or(0);

    rows.iter()
        .rposition(|row| {
            used_width(row) == dominant
                && row
                    .iter()
                    .take(dominant)
                    .all(|cell| is_label(cell.trim()))
        })
        .unwrap_or(0)
}

/// Number of cells up to and including the last non-empty one.
fn used_width(row: &[String]) -> usize {
    row.iter()
        .rposition(|c| !c.trim().is_empty())
        .map_or(0, |i| i + 1)
}

fn is_label(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_err() && !is_date_like(cell)
}

/// Header text never parses as a timestamp; sampler logs sometimes carry one
/// per row.
fn is_date_like(s: &str) -> bool {
    let lower = s.to_lowercase();
    if !s.contains('/') && !s.contains(':') && !s.contains('-') && !lower.contains("am") && !lower.contains("pm") {
        return false;
    }

    use chrono::{NaiveDate, NaiveDateTime};
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S", "%d/%m/%Y %H:%M:%S"];
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

/// Columns that hold mostly numbers across the sampled rows.
pub fn numeric_columns(column_data: &[Vec<String>], sample: usize) -> Vec<usize> {
    column_data
        .iter()
        .enumerate()
        .filter(|(_, data)| {
            let cells: Vec<&str> = data
                .iter()
                .take(sample)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            let numeric = cells.iter().filter(|s| s.parse::<f64>().is_ok()).count();
            !cells.is_empty() && numeric * 2 >= cells.len()
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.split(',').map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_on_first_row() {
        let r = rows(&["mu,sigma", "0.1,1.0", "0.2,1.1"]);
        assert_eq!(detect_header_row(&r, 50), 0);
    }

    #[test]
    fn test_header_after_metadata() {
        let r = rows(&["# sampler", "chains 4", "mu,sigma,tau", "0.1,1.0,2", "0.2,1.1,3", "0.3,1.2,4"]);
        assert_eq!(detect_header_row(&r, 50), 2);
    }

    #[test]
    fn test_dates_are_not_headers() {
        let r = rows(&["draw,value", "2024-01-01,1.0", "2024-01-02,2.0"]);
        assert_eq!(detect_header_row(&r, 50), 0);
        assert!(is_date_like("2024-01-01"));
        assert!(!is_date_like("log-likelihood"));
    }

    #[test]
    fn test_headerless_falls_back_to_zero() {
        let r = rows(&["1,2", "3,4"]);
        assert_eq!(detect_header_row(&r, 50), 0);
        assert_eq!(detect_header_row(&[], 50), 0);
    }

    #[test]
    fn test_numeric_columns() {
        let data = vec![
            vec!["1".to_string(), "2".to_string()],
            vec!["a".to_string(), "b".to_string()],
            vec!["3".to_string(), "".to_string(), "x".to_string()],
        ];
        assert_eq!(numeric_columns(&data, 100), vec![0, 2]);
    }
}
