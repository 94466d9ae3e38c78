pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::form::{FenceHeight, GroundCondition, SiteDuration};
#[cfg(feature = "cli")]
use crate::domain::model::LatLon;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fence-quote")]
#[command(about = "Site-specific temporary fencing quick setup")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Access PIN; only needed until the session flag is stored
    #[arg(long)]
    pub pin: Option<String>,

    /// Clear the stored session flag and exit
    #[arg(long)]
    pub logout: bool,

    #[arg(long, default_value = "")]
    pub project_name: String,

    #[arg(long, default_value = "")]
    pub postcode: String,

    #[arg(long, default_value = "2.0 m")]
    pub height: FenceHeight,

    #[arg(long, default_value = "< 28 days")]
    pub duration: SiteDuration,

    #[arg(long, default_value = "hardstanding")]
    pub ground: GroundCondition,

    /// Distance to sea, km
    #[arg(long, default_value = "")]
    pub distance_to_sea: String,

    /// Altitude, m AOD
    #[arg(long, default_value = "")]
    pub altitude: String,

    /// Simulate a map click at LAT,LON (repeatable)
    #[arg(long, value_parser = parse_lat_lon)]
    pub click: Vec<LatLon>,

    /// Simulate dragging the marker to LAT,LON (repeatable)
    #[arg(long, value_parser = parse_lat_lon)]
    pub drag: Vec<LatLon>,

    /// Fence option ids to select, comma separated
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Print the download manifest for the selection
    #[arg(long)]
    pub download: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
fn parse_lat_lon(raw: &str) -> std::result::Result<LatLon, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", raw))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinate out of range: {}", raw));
    }
    Ok(LatLon::new(lat, lon))
}
