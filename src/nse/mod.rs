pub mod config;
pub mod models;
pub mod nse_client;
pub mod nse_commands;
pub mod processor;
pub mod recorder;
pub mod report;

// Re-exports (public API)
pub use models::{IndexSnapshot, OptionChain, OptionData, OptionDetail};
pub use nse_client::NSEClient;
pub use nse_commands::{compute_row, validate_expiry, NSECommands};
pub use processor::{
    aggregate_bands,
    filter_strike_bands,
    nearest_expiry,
    put_call_ratio,
    support_resistance,
    vwap,
    BandAggregates,
    SupportResistance,
    VwapMode,
    VwapTracker,
};
pub use recorder::{append_row, log_file_name, IndicatorRow};
