use super::recorder::IndicatorRow;
use colored::Colorize;
use std::collections::BTreeMap;

/// Change of each band's value since the previous iteration. Bands the
/// previous iteration did not have are left out.
pub fn band_deltas(
    current: &BTreeMap<u32, f64>,
    previous: &BTreeMap<u32, f64>,
) -> BTreeMap<u32, f64> {
    current
        .iter()
        .filter_map(|(band, value)| previous.get(band).map(|prev| (*band, value - prev)))
        .collect()
}

fn fmt_level(level: Option<f64>) -> String {
    level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
}

fn fmt_delta(delta: Option<&f64>) -> String {
    match delta {
        Some(d) if *d > 0.0 => format!(" (Change: {:+.4})", d).green().to_string(),
        Some(d) if *d < 0.0 => format!(" (Change: {:+.4})", d).red().to_string(),
        Some(d) => format!(" (Change: {:.4})", d).dimmed().to_string(),
        None => String::new(),
    }
}

/// Console snapshot of one iteration. `previous` is the row printed last
/// time, `None` on the first iteration.
pub fn print_snapshot(row: &IndicatorRow, previous: Option<&IndicatorRow>) {
    let ratio_deltas = previous
        .map(|prev| band_deltas(&row.aggregates.ratios, &prev.aggregates.ratios))
        .unwrap_or_default();
    let diff_deltas = previous
        .map(|prev| band_deltas(&row.aggregates.differences, &prev.aggregates.differences))
        .unwrap_or_default();

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{} {}", "Latest Data".cyan().bold(), row.timestamp.as_str().dimmed());
    println!("{}", "=".repeat(60).blue());
    println!("{} Current Price: {:.2}", "→".cyan(), row.price);
    match row.vwap {
        Some(v) => println!("{} VWAP: {:.2}", "→".cyan(), v),
        None => println!("{} VWAP: {}", "⚠".yellow(), "N/A".yellow()),
    }

    let [s1, s2, s3] = row.levels.support;
    let [r1, r2, r3] = row.levels.resistance;
    println!(
        "{} Support levels: S1={}, S2={}, S3={}",
        "▼".green(),
        fmt_level(s1),
        fmt_level(s2),
        fmt_level(s3)
    );
    println!(
        "{} Resistance levels: R1={}, R2={}, R3={}",
        "▲".red(),
        fmt_level(r1),
        fmt_level(r2),
        fmt_level(r3)
    );
    println!();

    for (band, ratio) in &row.aggregates.ratios {
        println!("pcr{}: {:.4}{}", band, ratio, fmt_delta(ratio_deltas.get(band)));
    }
    for (band, diff) in &row.aggregates.differences {
        println!("difference{}: {:.4}{}", band, diff, fmt_delta(diff_deltas.get(band)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_deltas() {
        let previous = BTreeMap::from([(1, 1.0), (2, 2.0)]);
        let current = BTreeMap::from([(1, 1.5), (2, 1.0), (3, 9.0)]);

        let deltas = band_deltas(&current, &previous);
        assert_eq!(deltas, BTreeMap::from([(1, 0.5), (2, -1.0)]));
    }

    #[test]
    fn test_band_deltas_first_iteration() {
        let current = BTreeMap::from([(1, 1.5)]);
        assert!(band_deltas(&current, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_fmt_level() {
        assert_eq!(fmt_level(Some(24000.0)), "24000");
        assert_eq!(fmt_level(None), "-");
    }
}
