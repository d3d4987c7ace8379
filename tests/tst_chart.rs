use nse_pcr_tracker::chart::{load_series, ChartCommands};
use nse_pcr_tracker::nse::{append_row, BandAggregates, IndicatorRow, SupportResistance};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_log(path: &Path, rows: usize) {
        for i in 0..rows {
            let mut aggregates = BandAggregates::default();
            for band in [1u32, 2, 3] {
                aggregates.ratios.insert(band, 1.0 + i as f64 * 0.1);
                aggregates
                    .differences
                    .insert(band, (i as f64 - 2.0) * 250_000.0 * band as f64);
            }

            let row = IndicatorRow {
                timestamp: format!("2024-07-25 09:{:02}:00", 15 + i),
                aggregates,
                levels: SupportResistance {
                    support: [Some(24000.0), Some(23900.0), Some(23800.0)],
                    resistance: [Some(24500.0), Some(24400.0), None],
                },
                price: 24000.0 + i as f64 * 5.0,
                // first row has no VWAP yet
                vwap: (i > 0).then(|| 23990.0 + i as f64),
            };
            append_row(path, &row).unwrap();
        }
    }

    #[test]
    fn test_load_series_from_written_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realtime_pcr_data_2024-07-25_expiry_25-Jul-2024.csv");
        write_log(&path, 4);

        let data = load_series(&path).unwrap();
        assert_eq!(data.timestamps.len(), 4);
        assert_eq!(data.offsets(), vec![0.0, 60.0, 120.0, 180.0]);

        let names: Vec<&str> = data.difference_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["difference1", "difference2", "difference3"]);

        let vwap = data.column("VWAP").unwrap();
        assert_eq!(vwap.values[0], None);
        assert_eq!(vwap.values[1], Some(23991.0));

        let r3 = data.column("r3").unwrap();
        assert!(r3.values.iter().all(Option::is_none));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        let err = load_series(&path).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(ChartCommands::run(&path).is_err());
    }

    #[test]
    fn test_charts_rendered_next_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realtime_pcr_data_2024-07-25_expiry_25-Jul-2024.csv");
        write_log(&path, 6);

        let (difference, price_vwap) = ChartCommands::run(&path).unwrap();
        assert_eq!(
            difference,
            dir.path().join("realtime_pcr_data_2024-07-25_expiry_25-Jul-2024_graph.svg")
        );
        assert_eq!(
            price_vwap,
            dir.path().join("realtime_pcr_data_2024-07-25_expiry_25-Jul-2024_price_vwap.svg")
        );

        for out in [&difference, &price_vwap] {
            let svg = std::fs::read_to_string(out).unwrap();
            assert!(svg.contains("<svg"));
        }
    }
}
