pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{map::HeadlessMap, nominatim::NominatimClient};
pub use config::{cli::FileSessionStore, toml_config::AppConfig};
pub use core::{
    gate::AccessGate,
    quote::QuoteSession,
    sync::GeocodeSynchronizer,
    wind::estimate_wind,
};
pub use utils::error::{FenceError, Result};
