//! Joins vehicle positions with trip updates into the transport records
//! served by `/api/transport`.

use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::stops::StopDirectory;
use crate::transit::{StopTimeUpdate, TripUpdate, VehiclePosition};

/// Upcoming stop with its resolved display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopEta {
    /// Display name from the stop directory, or the raw stop id when unknown.
    pub stop_id: String,
    /// Arrival as 24-hour `HH:MM`.
    pub eta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedVehicle {
    pub id: String,
    pub label: String,
    pub route_id: String,
    pub direction_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub bearing: i64,
    pub current_status: String,
    pub occupancy: String,
    pub next_stops: Vec<StopEta>,
}

/// Formats a POSIX timestamp as `HH:MM` in `tz`.
///
/// Timestamps chrono cannot represent render as `--:--`.
pub fn format_eta_in<Tz>(epoch: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp(epoch, 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// Formats a POSIX timestamp as `HH:MM` in the server's local time.
pub fn format_eta(epoch: i64) -> String {
    format_eta_in(epoch, &Local)
}

/// [`join_in`] using the server's local time zone.
pub fn join(
    vehicles: &[VehiclePosition],
    updates: &[TripUpdate],
    label_filter: &str,
    stops: &StopDirectory,
) -> Vec<EnrichedVehicle> {
    join_in(vehicles, updates, label_filter, stops, &Local)
}

/// Enriches each vehicle whose label contains `label_filter`
/// (case-insensitive, empty matches all) with the stop-time updates of every
/// trip update sharing its trip id.
///
/// Vehicles keep their feed order. Stop-time updates are concatenated in feed
/// order across all matching trip updates, without sorting or deduplication.
pub fn join_in<Tz>(
    vehicles: &[VehiclePosition],
    updates: &[TripUpdate],
    label_filter: &str,
    stops: &StopDirectory,
    tz: &Tz,
) -> Vec<EnrichedVehicle>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let filter = label_filter.to_lowercase();

    let mut by_trip: HashMap<&str, Vec<&StopTimeUpdate>> = HashMap::new();
    for update in updates {
        by_trip
            .entry(update.trip_id.as_str())
            .or_default()
            .extend(&update.stop_time_updates);
    }

    vehicles
        .iter()
        .filter(|v| filter.is_empty() || v.label.to_lowercase().contains(&filter))
        .map(|v| {
            let next_stops = by_trip
                .get(v.trip_id.as_str())
                .map(|stus| {
                    stus.iter()
                        .map(|s| StopEta {
                            stop_id: stops.lookup(&s.stop_id).to_string(),
                            eta: format_eta_in(s.arrival, tz),
                        })
                        .collect()
                })
                .unwrap_or_default();

            EnrichedVehicle {
                id: v.id.clone(),
                label: v.label.clone(),
                route_id: v.route_id.clone(),
                direction_id: v.direction_id,
                lat: v.lat,
                lon: v.lon,
                bearing: v.bearing.round() as i64,
                current_status: v.current_status.clone(),
                occupancy: v.occupancy.clone(),
                next_stops,
            }
        })
        .collect()
}
