use nse_pcr_tracker::nse::{
    append_row,
    log_file_name,
    BandAggregates,
    IndicatorRow,
    SupportResistance,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(timestamp: &str, vwap: Option<f64>) -> IndicatorRow {
        let mut aggregates = BandAggregates::default();
        for band in 1..=3u32 {
            aggregates.ratios.insert(band, 0.5 * band as f64);
            aggregates.differences.insert(band, -100.0 * band as f64);
        }

        IndicatorRow {
            timestamp: timestamp.to_string(),
            aggregates,
            levels: SupportResistance {
                support: [Some(24000.0), Some(23900.0), None],
                resistance: [Some(24500.0), None, None],
            },
            price: 24123.45,
            vwap,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        assert!(append_row(&path, &row("2024-07-25 09:30:00", Some(24100.5))).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        assert!(!append_row(&path, &row("2024-07-25 09:30:30", None)).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        assert_eq!(
            lines[0],
            "Timestamp,pcr1,pcr2,pcr3,difference1,difference2,difference3,s1,s2,s3,r1,r2,r3,Price,VWAP"
        );
        assert_eq!(
            lines[1],
            "2024-07-25 09:30:00,0.5,1,1.5,-100,-200,-300,24000,23900,,24500,,,24123.45,24100.5"
        );
        assert!(lines[2].ends_with(",24123.45,N/A"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("Timestamp")).count(), 1);
    }

    #[test]
    fn test_existing_file_gets_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "Timestamp,pcr1\n").unwrap();

        assert!(!append_row(&path, &row("2024-07-25 09:30:00", None)).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("log.csv");
        assert!(append_row(&path, &row("2024-07-25 09:30:00", None)).is_err());
    }

    #[test]
    fn test_log_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 30).unwrap();
        assert_eq!(
            log_file_name(date, "01-Aug-2024"),
            "realtime_pcr_data_2024-07-30_expiry_01-Aug-2024.csv"
        );
    }
}
