use anyhow::{Context, Result};
use colored::Colorize;
use nse_pcr_tracker::chart::ChartCommands;
use nse_pcr_tracker::nse::NSECommands;
use nse_pcr_tracker::{logging, AppConfig, Mode};
use tracing::error;

// One thread of control: every fetch, write and sleep runs in sequence
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ========================================
    // CONFIGURATION - from environment
    // ========================================
    let app = match AppConfig::from_env() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            AppConfig::print_usage();
            std::process::exit(1);
        }
    };

    logging::init_logging(&app.log_dir)?;

    let result = match app.mode {
        Mode::Poll => NSECommands::run_poll(&app).await,
        Mode::Chart => {
            let input = app
                .chart_input
                .as_deref()
                .context("NSE_CHART_INPUT is not set")?;
            ChartCommands::run(input).map(|_| ())
        }
    };

    if let Err(e) = result {
        error!(error = %format!("{:#}", e), "Exiting");
        eprintln!("{} {:#}. Exiting...", "✗".red(), e);
        std::process::exit(1);
    }

    Ok(())
}
