use super::config;
use super::models::{IndexSnapshot, OptionData};
use super::processor::{self, VwapTracker};
use super::recorder::{self, IndicatorRow};
use super::report;
use super::NSEClient;
use crate::app_config::AppConfig;
use crate::error::FetchError;
use crate::utility::Timer;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// State carried from startup into the poll loop
pub(crate) struct PollState {
    pub(crate) expiry: String,
    pub(crate) output_path: PathBuf,
    pub(crate) tracker: VwapTracker,
    /// Row printed by the last successful cycle
    pub(crate) previous: Option<IndicatorRow>,
}

/// NSE Command Handler - startup, expiry selection and the poll loop
pub struct NSECommands;

impl NSECommands {
    /// Fetch once to pick an expiry, then log indicators every
    /// `poll_interval` until the process is killed
    pub async fn run_poll(app: &AppConfig) -> Result<()> {
        let client = NSEClient::new(&app.index, &app.symbol)?;
        Self::run_poll_with(&client, app).await
    }

    /// Same as `run_poll` against an already built client
    pub async fn run_poll_with(client: &NSEClient, app: &AppConfig) -> Result<()> {
        let mut state = Self::startup(client, app).await?;

        loop {
            let timer = Timer::start_with_threshold("poll cycle", config::SLOW_CYCLE_MS);
            Self::poll_cycle(client, app, &mut state).await;
            timer.stop();

            tokio::time::sleep(app.poll_interval).await;
        }
    }

    /// Startup fetches, expiry choice and output file. Every failure here
    /// is fatal.
    pub(crate) async fn startup(client: &NSEClient, app: &AppConfig) -> Result<PollState> {
        println!("{}", "=".repeat(60).blue());
        println!("{}", "NSE Put-Call Ratio Tracker".green().bold());
        println!("{}", "=".repeat(60).blue());
        println!();

        let startup = client
            .fetch_index_snapshot()
            .await
            .with_context(|| format!("Failed to fetch {} data", client.index()))?;
        println!("{} Current {} Price: {}", "✓".green(), client.index().yellow(), startup.last_price);

        let chain = client
            .fetch_option_chain()
            .await
            .context("Failed to fetch option chain data")?;
        let expiries = chain.expiry_dates();
        Self::display_expiries(&expiries);

        let expiry = match &app.expiry {
            Some(preset) => validate_expiry(preset, &expiries)?,
            None => Self::prompt_expiry(&expiries).await?,
        };

        let output_path = Self::prepare_output(&app.output_dir, &expiry, Utc::now())?;
        println!("{} Expiry: {}", "→".cyan(), expiry.yellow());
        println!("{} Logging to: {}", "→".cyan(), output_path.display());
        println!(
            "{} Polling every {}s, {} bands of {}",
            "ℹ".blue(),
            app.poll_interval.as_secs(),
            app.bands.len(),
            app.strike_step
        );

        info!(
            symbol = %client.symbol(),
            expiry = %expiry,
            path = %output_path.display(),
            vwap_mode = ?app.vwap_mode,
            "Starting poll loop"
        );

        Ok(PollState {
            expiry,
            output_path,
            tracker: VwapTracker::new(app.vwap_mode, &startup),
            previous: None,
        })
    }

    /// One iteration of the loop. A failed fetch skips the iteration and
    /// leaves `previous` alone. Returns whether a row was appended.
    pub(crate) async fn poll_cycle(client: &NSEClient, app: &AppConfig, state: &mut PollState) -> bool {
        let row = match Self::poll_once(client, app, &state.expiry, &state.tracker).await {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "Fetch failed, skipping this iteration");
                println!("{} Failed to fetch data. Skipping this iteration...", "✗".red());
                return false;
            }
        };

        report::print_snapshot(&row, state.previous.as_ref());

        let appended = match recorder::append_row(&state.output_path, &row) {
            Ok(_) => {
                println!(
                    "{} Data has been appended to {}",
                    "✓".green(),
                    state.output_path.display()
                );
                true
            }
            Err(e) => {
                error!(error = %e, path = %state.output_path.display(), "CSV append failed, row lost");
                false
            }
        };

        state.previous = Some(row);
        appended
    }

    /// One fetch → filter → aggregate cycle
    async fn poll_once(
        client: &NSEClient,
        app: &AppConfig,
        expiry: &str,
        tracker: &VwapTracker,
    ) -> Result<IndicatorRow, FetchError> {
        let snapshot = client.fetch_index_snapshot().await?;
        let data = client.fetch_option_data().await?;

        Ok(compute_row(&snapshot, &data, app, expiry, tracker, Utc::now()))
    }

    fn display_expiries(expiries: &[String]) {
        println!("{} Expiry Dates:", "ℹ".blue());
        for chunk in expiries.chunks(6) {
            println!("  {}", chunk.join("  "));
        }
        println!();
    }

    /// Ask on stdin for one of `expiries`
    async fn prompt_expiry(expiries: &[String]) -> Result<String> {
        let now_ist = Utc::now().with_timezone(&config::ist_offset()).naive_local();
        let hint = processor::nearest_expiry(expiries, now_ist)
            .map(|e| format!(" [nearest: {}]", e))
            .unwrap_or_default();

        print!(
            "Please enter your desired expiry date from the list above (e.g. 25-Jul-2024){}: ",
            hint
        );
        std::io::stdout().flush()?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .context("Failed to read expiry from stdin")?;

        validate_expiry(&line, expiries)
    }

    /// Output directory is created if needed; the file name carries the
    /// IST date and the expiry
    fn prepare_output(output_dir: &Path, expiry: &str, now: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let today = now.with_timezone(&config::ist_offset()).date_naive();
        Ok(output_dir.join(recorder::log_file_name(today, expiry)))
    }
}

/// Exact match against the fetched list, after trimming whitespace
pub fn validate_expiry(input: &str, expiries: &[String]) -> Result<String> {
    let input = input.trim();
    if expiries.iter().any(|e| e == input) {
        Ok(input.to_string())
    } else {
        bail!(
            "Invalid expiry date '{}'. Please enter a valid date from the list.",
            input
        )
    }
}

/// Indicator row for one pair of snapshots
pub fn compute_row(
    snapshot: &IndexSnapshot,
    data: &[OptionData],
    app: &AppConfig,
    expiry: &str,
    tracker: &VwapTracker,
    now: DateTime<Utc>,
) -> IndicatorRow {
    let price = snapshot.last_price;
    let filtered = processor::filter_strike_bands(data, price, &app.bands, app.strike_step, expiry);

    IndicatorRow {
        timestamp: recorder::ist_timestamp(now),
        aggregates: processor::aggregate_bands(&filtered),
        levels: processor::support_resistance(data),
        price,
        vwap: tracker.next(snapshot),
    }
}
