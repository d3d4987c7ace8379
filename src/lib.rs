pub mod app_config;
pub mod chart;
pub mod error;
pub mod logging;
pub mod nse;
pub mod utility;

// Re-exports for convenience
pub use app_config::{AppConfig, Mode};
pub use error::FetchError;
pub use nse::NSEClient;
