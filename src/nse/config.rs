use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

/// Page loaded before the option-chain API so the session carries its cookies
pub const OPTION_CHAIN_PAGE: &str = "/option-chain";

pub fn nse_index_url(base: &str, index: &str) -> String {
    format!(
        "{}/api/equity-stockIndices?index={}",
        base,
        urlencoding::encode(index)
    )
}

pub fn nse_option_chain_url(base: &str, symbol: &str) -> String {
    format!(
        "{}/api/option-chain-indices?symbol={}",
        base,
        urlencoding::encode(symbol)
    )
}

// -----------------------------------------------
// INSTRUMENT DEFAULTS
// -----------------------------------------------
pub const DEFAULT_INDEX: &str = "NIFTY 50";
pub const DEFAULT_SYMBOL: &str = "NIFTY";
pub const DEFAULT_STRIKE_STEP: f64 = 50.0;
pub const DEFAULT_MAX_BAND: u32 = 30;

/// Band widths `1..=max_band`
pub fn strike_bands(max_band: u32) -> Vec<u32> {
    (1..=max_band).collect()
}

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

pub const HEADER_REFERER: &str = "https://www.nseindia.com/";
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";
pub const HEADER_ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

// -----------------------------------------------
// POLL LOOP
// -----------------------------------------------
pub const DEFAULT_POLL_SECS: u64 = 30;

/// Cycles slower than this get a warning in the log
pub const SLOW_CYCLE_MS: u128 = 10_000;

// -----------------------------------------------
// OUTPUT
// -----------------------------------------------
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const LOG_FILE_NAME: &str = "nse-pcr-tracker.log";

pub const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";

pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Asia/Kolkata, which has no daylight saving
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

// -----------------------------------------------
// CHARTS
// -----------------------------------------------
pub const CHART_WIDTH: u32 = 2000;
pub const CHART_HEIGHT: u32 = 1000;
pub const DIFFERENCE_Y_LIMIT: f64 = 1_000_000.0;
