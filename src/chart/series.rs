use crate::nse::config;
use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use std::ops::Range;
use std::path::Path;

/// One numeric column of the CSV log; gaps are `None`
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// The CSV log, column-wise
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub timestamps: Vec<NaiveDateTime>,
    pub columns: Vec<Column>,
}

impl ChartData {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// `difference1`, `difference2`, ... in file order
    pub fn difference_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| {
            c.name
                .strip_prefix("difference")
                .is_some_and(|band| band.parse::<u32>().is_ok())
        })
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    /// Seconds since the first sample
    pub fn offsets(&self) -> Vec<f64> {
        let Some(start) = self.start() else {
            return Vec::new();
        };
        self.timestamps
            .iter()
            .map(|t| (*t - start).num_milliseconds() as f64 / 1000.0)
            .collect()
    }

    /// x extent in seconds; never empty so a one-row log still plots
    pub fn x_range(&self) -> Range<f64> {
        let offsets = self.offsets();
        let end = offsets.iter().copied().fold(0.0, f64::max);
        0.0..end.max(1.0)
    }

    /// (seconds, value) for the present cells of `column`
    pub fn points(&self, column: &Column) -> Vec<(f64, f64)> {
        self.offsets()
            .into_iter()
            .zip(&column.values)
            .filter_map(|(x, v)| v.map(|v| (x, v)))
            .collect()
    }
}

/// Empty cells and `N/A` are gaps; anything else must be a number to count
fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("n/a") {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a CSV log written by the poll loop
pub fn load_series(path: &Path) -> Result<ChartData> {
    if !path.exists() {
        bail!("The file '{}' does not exist", path.display());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Error reading the CSV file {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let ts_idx = headers
        .iter()
        .position(|h| h == "Timestamp")
        .with_context(|| format!("No Timestamp column in {}", path.display()))?;

    let mut data = ChartData {
        timestamps: Vec::new(),
        columns: headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != ts_idx)
            .map(|(_, name)| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect(),
    };

    for (row_no, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad CSV row {}", row_no + 1))?;

        let ts = record.get(ts_idx).unwrap_or_default();
        let timestamp = NaiveDateTime::parse_from_str(ts.trim(), config::ROW_TIMESTAMP_FORMAT)
            .with_context(|| format!("Bad timestamp '{}' in row {}", ts, row_no + 1))?;
        data.timestamps.push(timestamp);

        let cells = record
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != ts_idx)
            .map(|(_, cell)| cell);
        for (column, cell) in data.columns.iter_mut().zip(cells) {
            column.values.push(parse_cell(cell));
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("2.5"), Some(2.5));
        assert_eq!(parse_cell(" -7 "), Some(-7.0));
        assert_eq!(parse_cell("N/A"), None);
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("NaN"), None);
    }

    #[test]
    fn test_difference_columns_skip_levels() {
        let column = |name: &str| Column { name: name.to_string(), values: vec![] };
        let data = ChartData {
            timestamps: vec![],
            columns: vec![
                column("pcr1"),
                column("difference1"),
                column("difference2"),
                column("differenceX"),
                column("s1"),
            ],
        };

        let names: Vec<&str> = data.difference_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["difference1", "difference2"]);
    }

    #[test]
    fn test_x_range_single_row() {
        let data = ChartData {
            timestamps: vec![NaiveDateTime::parse_from_str("2024-07-25 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap()],
            columns: vec![],
        };
        assert_eq!(data.x_range(), 0.0..1.0);
    }
}
