//! CLI / environment configuration via clap.
//!
//! Every option can also come from the environment (or a `.env` file loaded
//! before parsing).

use std::path::PathBuf;

use clap::Parser;

use crate::openweather;

pub const DEFAULT_VEHICLE_POSITIONS_URL: &str =
    "https://gtfs.bus-tracker.fr/gtfs-rt/tcar/vehicle-positions.json";
pub const DEFAULT_TRIP_UPDATES_URL: &str =
    "https://gtfs.bus-tracker.fr/gtfs-rt/tcar/trip-updates.json";

#[derive(Parser, Debug, Clone)]
#[command(name = "city-dashboard")]
#[command(about = "Serves the city dashboard and its weather, transit, crime and events API")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// HTTP port
    #[arg(short, long, env = "PORT", default_value_t = 7070)]
    pub port: u16,

    /// GTFS stops.txt used to resolve stop names
    #[arg(long, env = "STOPS_FILE", default_value = "./stops.txt")]
    pub stops_file: PathBuf,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Dashboard page served at /
    #[arg(long, env = "DASHBOARD_TEMPLATE", default_value = "templates/dashboard.html")]
    pub template: PathBuf,

    /// GTFS-RT vehicle positions feed (JSON)
    #[arg(long, env = "VEHICLE_POSITIONS_URL", default_value = DEFAULT_VEHICLE_POSITIONS_URL)]
    pub vehicle_positions_url: String,

    /// GTFS-RT trip updates feed (JSON)
    #[arg(long, env = "TRIP_UPDATES_URL", default_value = DEFAULT_TRIP_UPDATES_URL)]
    pub trip_updates_url: String,

    /// OpenWeather API base URL
    #[arg(long, env = "OPENWEATHER_BASE_URL", default_value = openweather::DEFAULT_BASE_URL)]
    pub openweather_url: String,

    /// OpenWeather API key; the weather routes answer 500 without it
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub openweather_api_key: Option<String>,

    /// City used when a weather request has no `city` parameter
    #[arg(long, env = "DEFAULT_CITY", default_value = "Rouen")]
    pub default_city: String,
}
