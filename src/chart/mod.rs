//! Offline charts from a CSV log written by the poll loop.

pub mod render;
pub mod series;

pub use render::{format_thousands, render_difference_chart, render_price_vwap_chart};
pub use series::{load_series, ChartData, Column};

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

/// `<dir>/<stem><suffix>.svg` next to the input
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    input.with_file_name(format!("{}{}.svg", stem, suffix))
}

pub struct ChartCommands;

impl ChartCommands {
    /// Render both charts for `input`; returns (difference chart, price/VWAP chart)
    pub fn run(input: &Path) -> Result<(PathBuf, PathBuf)> {
        println!("{}", "=".repeat(60).blue());
        println!("{}", "PCR Log Charts".green().bold());
        println!("{}", "=".repeat(60).blue());
        println!();

        let data = load_series(input)?;
        println!("{} Loaded {} rows from {}", "✓".green(), data.timestamps.len(), input.display());

        let difference_out = sibling(input, "_graph");
        render_difference_chart(&data, &difference_out)?;
        println!("{} Graph saved as {}", "✓".green(), difference_out.display());

        let price_out = sibling(input, "_price_vwap");
        render_price_vwap_chart(&data, &price_out)?;
        println!("{} Graph saved as {}", "✓".green(), price_out.display());

        info!(
            rows = data.timestamps.len(),
            difference = %difference_out.display(),
            price_vwap = %price_out.display(),
            "Charts rendered"
        );

        Ok((difference_out, price_out))
    }
}
