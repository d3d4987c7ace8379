use crate::nse::config;
use crate::nse::processor::VwapMode;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fetch, aggregate and log forever
    Poll,
    /// Render charts from an existing CSV log
    Chart,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poll" => Ok(Mode::Poll),
            "chart" => Ok(Mode::Chart),
            other => Err(format!("Invalid mode '{}'. Use 'poll' or 'chart'", other)),
        }
    }
}

/// Application configuration handler
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub index: String,
    pub symbol: String,
    pub strike_step: f64,
    pub bands: Vec<u32>,
    pub poll_interval: Duration,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    pub expiry: Option<String>,
    pub vwap_mode: VwapMode,
    pub chart_input: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Poll,
            index: config::DEFAULT_INDEX.to_string(),
            symbol: config::DEFAULT_SYMBOL.to_string(),
            strike_step: config::DEFAULT_STRIKE_STEP,
            bands: config::strike_bands(config::DEFAULT_MAX_BAND),
            poll_interval: Duration::from_secs(config::DEFAULT_POLL_SECS),
            output_dir: PathBuf::from(config::DEFAULT_OUTPUT_DIR),
            log_dir: PathBuf::from(config::DEFAULT_LOG_DIR),
            expiry: None,
            vwap_mode: VwapMode::Running,
            chart_input: None,
        }
    }
}

impl AppConfig {
    /// Create new configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match var("NSE_MODE") {
            Some(v) => v.parse::<Mode>().map_err(anyhow::Error::msg)?,
            None => defaults.mode,
        };

        let vwap_mode = match var("NSE_VWAP_MODE") {
            Some(v) => v.parse::<VwapMode>().map_err(anyhow::Error::msg)?,
            None => defaults.vwap_mode,
        };

        let strike_step = parse_or(var("NSE_STRIKE_STEP"), "NSE_STRIKE_STEP", defaults.strike_step)?;
        let max_band = parse_or(var("NSE_MAX_BAND"), "NSE_MAX_BAND", config::DEFAULT_MAX_BAND)?;
        let poll_secs = parse_or(var("NSE_POLL_SECS"), "NSE_POLL_SECS", config::DEFAULT_POLL_SECS)?;

        let app = Self {
            mode,
            index: var("NSE_INDEX").unwrap_or(defaults.index),
            symbol: var("NSE_SYMBOL").unwrap_or(defaults.symbol),
            strike_step,
            bands: config::strike_bands(max_band),
            poll_interval: Duration::from_secs(poll_secs),
            output_dir: var("NSE_OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            log_dir: var("NSE_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            expiry: var("NSE_EXPIRY").map(|v| v.trim().to_string()),
            vwap_mode,
            chart_input: var("NSE_CHART_INPUT").map(PathBuf::from),
        };

        app.validate()?;
        Ok(app)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.strike_step.is_finite() && self.strike_step > 0.0) {
            bail!("NSE_STRIKE_STEP must be a positive number, got {}", self.strike_step);
        }
        if self.bands.is_empty() {
            bail!("NSE_MAX_BAND must be at least 1");
        }
        if self.poll_interval.is_zero() {
            bail!("NSE_POLL_SECS must be at least 1");
        }
        if self.mode == Mode::Chart && self.chart_input.is_none() {
            bail!("Chart mode needs NSE_CHART_INPUT pointing at a CSV log");
        }
        Ok(())
    }

    /// Print usage instructions
    pub fn print_usage() {
        eprintln!("Set NSE_MODE environment variable to control execution mode");
        eprintln!("Examples:");
        eprintln!("  NSE_MODE=poll cargo run                          # Track PCR every 30s");
        eprintln!("  NSE_MODE=poll NSE_EXPIRY=25-Jul-2024 cargo run   # Skip the expiry prompt");
        eprintln!("  NSE_MODE=chart NSE_CHART_INPUT=realtime_pcr_data_2024-07-25_expiry_25-Jul-2024.csv cargo run");
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, v, e)),
        None => Ok(default),
    }
}
