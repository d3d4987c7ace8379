use super::config;
use super::processor::{BandAggregates, SupportResistance};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom};
use std::path::Path;

pub const VWAP_MISSING: &str = "N/A";

/// One line of the CSV log
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub timestamp: String,
    pub aggregates: BandAggregates,
    pub levels: SupportResistance,
    pub price: f64,
    pub vwap: Option<f64>,
}

impl IndicatorRow {
    /// `Timestamp, pcr<b>.., difference<b>.., s1..s3, r1..r3, Price, VWAP`
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["Timestamp".to_string()];
        header.extend(self.aggregates.ratios.keys().map(|band| format!("pcr{}", band)));
        header.extend(
            self.aggregates
                .differences
                .keys()
                .map(|band| format!("difference{}", band)),
        );
        header.extend(["s1", "s2", "s3", "r1", "r2", "r3", "Price", "VWAP"].map(String::from));
        header
    }

    pub fn record(&self) -> Vec<String> {
        let mut record = vec![self.timestamp.clone()];
        record.extend(self.aggregates.ratios.values().map(f64::to_string));
        record.extend(self.aggregates.differences.values().map(f64::to_string));
        record.extend(
            self.levels
                .support
                .iter()
                .chain(self.levels.resistance.iter())
                .map(|level| level.map(|s| s.to_string()).unwrap_or_default()),
        );
        record.push(self.price.to_string());
        record.push(
            self.vwap
                .map(|v| v.to_string())
                .unwrap_or_else(|| VWAP_MISSING.to_string()),
        );
        record
    }
}

/// `realtime_pcr_data_<date>_expiry_<expiry>.csv`
pub fn log_file_name(date: NaiveDate, expiry: &str) -> String {
    format!(
        "realtime_pcr_data_{}_expiry_{}.csv",
        date.format("%Y-%m-%d"),
        expiry
    )
}

/// Row timestamp in IST
pub fn ist_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&config::ist_offset())
        .format(config::ROW_TIMESTAMP_FORMAT)
        .to_string()
}

/// Append `row` to the log at `path`. The header goes in first when the
/// file is empty at open time. Returns whether the header was written.
pub fn append_row(path: &Path, row: &IndicatorRow) -> Result<bool> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let is_new = file.seek(SeekFrom::End(0))? == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_new {
        writer.write_record(row.header())?;
    }
    writer.write_record(row.record())?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(is_new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row() -> IndicatorRow {
        let mut aggregates = BandAggregates::default();
        aggregates.ratios.insert(1, 2.5);
        aggregates.ratios.insert(2, 0.0);
        aggregates.differences.insert(1, 3.0);
        aggregates.differences.insert(2, -7.0);

        IndicatorRow {
            timestamp: "2024-07-25 10:15:00".to_string(),
            aggregates,
            levels: SupportResistance {
                support: [Some(24000.0), Some(23900.0), None],
                resistance: [Some(24500.0), None, None],
            },
            price: 24123.45,
            vwap: None,
        }
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(
            row().header(),
            vec![
                "Timestamp", "pcr1", "pcr2", "difference1", "difference2", "s1", "s2", "s3",
                "r1", "r2", "r3", "Price", "VWAP"
            ]
        );
    }

    #[test]
    fn test_record_absent_values() {
        assert_eq!(
            row().record(),
            vec![
                "2024-07-25 10:15:00", "2.5", "0", "3", "-7", "24000", "23900", "", "24500", "",
                "", "24123.45", "N/A"
            ]
        );
    }

    #[test]
    fn test_log_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 30).unwrap();
        assert_eq!(
            log_file_name(date, "01-Aug-2024"),
            "realtime_pcr_data_2024-07-30_expiry_01-Aug-2024.csv"
        );
    }

    #[test]
    fn test_ist_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 7, 30, 4, 0, 0).unwrap();
        assert_eq!(ist_timestamp(now), "2024-07-30 09:30:00");
    }
}
