use super::series::ChartData;
use crate::nse::config;
use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;
use std::path::Path;

/// `1234567.891, 0` → `1,234,568`
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.001 rounds to "0", not "-0"
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn time_label(start: NaiveDateTime, offset_secs: f64) -> String {
    let at = start + Duration::milliseconds((offset_secs * 1000.0).round() as i64);
    at.format(config::ROW_TIMESTAMP_FORMAT).to_string()
}

/// Every `difference*` column against time, y fixed to ±1,000,000 with a
/// zero line
pub fn render_difference_chart(data: &ChartData, out: &Path) -> Result<()> {
    let columns: Vec<_> = data.difference_columns().collect();
    if columns.is_empty() {
        bail!("No difference columns to plot");
    }
    let start = data.start().context("The log has no rows")?;
    let x_range = data.x_range();
    let limit = config::DIFFERENCE_Y_LIMIT;

    let root = SVGBackend::new(out, (config::CHART_WIDTH, config::CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Timestamp vs Difference", ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range.clone(), -limit..limit)?;

    let x_fmt = |x: &f64| time_label(start, *x);
    let y_fmt = |y: &f64| format_thousands(*y, 0);
    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc("Difference")
        .x_labels(10)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .draw()?;

    for (idx, column) in columns.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        // clip like a fixed ylim would
        let points = data
            .points(column)
            .into_iter()
            .map(|(x, y)| (x, y.clamp(-limit, limit)));

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(column.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart.draw_series(LineSeries::new(
        vec![(x_range.start, 0.0), (x_range.end, 0.0)],
        RED.stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(())
}

/// Price and VWAP against time
pub fn render_price_vwap_chart(data: &ChartData, out: &Path) -> Result<()> {
    let price = data.column("Price").context("No Price column in the log")?;
    let vwap = data.column("VWAP").context("No VWAP column in the log")?;
    let start = data.start().context("The log has no rows")?;
    let x_range = data.x_range();

    let price_points = data.points(price);
    let vwap_points = data.points(vwap);

    let (lo, hi) = price_points
        .iter()
        .chain(&vwap_points)
        .map(|(_, y)| *y)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if !lo.is_finite() {
        bail!("No Price or VWAP values to plot");
    }
    let pad = ((hi - lo) * 0.05).max(1.0);

    let root = SVGBackend::new(out, (config::CHART_WIDTH, config::CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Price and VWAP over Time", ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, (lo - pad)..(hi + pad))?;

    let x_fmt = |x: &f64| time_label(start, *x);
    let y_fmt = |y: &f64| format_thousands(*y, 2);
    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Price / VWAP")
        .x_labels(10)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .draw()?;

    chart
        .draw_series(LineSeries::new(price_points, BLUE.stroke_width(2)))?
        .label("Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(vwap_points, RED.stroke_width(2)))?
        .label("VWAP")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1_234_567.0, 0), "1,234,567");
        assert_eq!(format_thousands(-1_000_000.0, 0), "-1,000,000");
        assert_eq!(format_thousands(24_350.5, 2), "24,350.50");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(-0.001, 0), "0");
    }

    #[test]
    fn test_time_label() {
        let start =
            NaiveDateTime::parse_from_str("2024-07-25 09:15:00", config::ROW_TIMESTAMP_FORMAT)
                .unwrap();
        assert_eq!(time_label(start, 90.0), "2024-07-25 09:16:30");
    }
}
