//! City dashboard backend.
//!
//! Proxies weather, air-quality, UV and GTFS-RT transit data into the JSON
//! shapes the dashboard page consumes, and serves the page itself.

pub mod aqi;
pub mod config;
pub mod error;
pub mod fetch;
pub mod join;
pub mod openweather;
pub mod report;
pub(crate) mod serde_utils;
pub mod server;
pub mod stops;
pub mod transit;
