//! GTFS-RT JSON feeds and the flat records the join works on.
//!
//! The `*Feed` types mirror the upstream nesting (`entity[].vehicle.trip.tripId`
//! and so on); [`VehicleFeed::into_positions`] and
//! [`TripUpdateFeed::into_trip_updates`] flatten them so the join never sees
//! wire-format structure.

use serde::Deserialize;

use crate::serde_utils::{de_lenient_i64, de_lenient_string, de_null_default};

/// One live vehicle, flattened from a vehicle-position entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePosition {
    pub id: String,
    pub label: String,
    pub route_id: String,
    pub direction_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub bearing: f64,
    pub current_status: String,
    pub occupancy: String,
    pub trip_id: String,
}

/// Ordered stop-time updates for one trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripUpdate {
    pub trip_id: String,
    pub stop_time_updates: Vec<StopTimeUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopTimeUpdate {
    pub stop_id: String,
    /// Arrival as a POSIX timestamp.
    pub arrival: i64,
}

// ---------------------------------------------------------------------------
// Vehicle positions feed
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VehicleFeed {
    #[serde(deserialize_with = "de_null_default")]
    pub entity: Vec<VehicleEntity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VehicleEntity {
    #[serde(deserialize_with = "de_null_default")]
    pub id: String,
    pub vehicle: Option<VehicleBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleBody {
    #[serde(deserialize_with = "de_null_default")]
    pub trip: TripDescriptor,
    #[serde(deserialize_with = "de_null_default")]
    pub position: Position,
    #[serde(deserialize_with = "de_lenient_string")]
    pub current_status: String,
    #[serde(deserialize_with = "de_lenient_string")]
    pub occupancy_status: String,
    #[serde(deserialize_with = "de_null_default")]
    pub vehicle: VehicleDescriptor,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripDescriptor {
    #[serde(deserialize_with = "de_null_default")]
    pub trip_id: String,
    #[serde(deserialize_with = "de_null_default")]
    pub route_id: String,
    #[serde(deserialize_with = "de_lenient_i64")]
    pub direction_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(deserialize_with = "de_null_default")]
    pub latitude: f64,
    #[serde(deserialize_with = "de_null_default")]
    pub longitude: f64,
    #[serde(deserialize_with = "de_null_default")]
    pub bearing: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VehicleDescriptor {
    #[serde(deserialize_with = "de_null_default")]
    pub id: String,
    #[serde(deserialize_with = "de_null_default")]
    pub label: String,
}

impl VehicleFeed {
    /// Flattens every entity carrying a vehicle body, in feed order.
    pub fn into_positions(self) -> Vec<VehiclePosition> {
        self.entity
            .into_iter()
            .filter_map(|e| e.vehicle)
            .map(|v| VehiclePosition {
                id: v.vehicle.id,
                label: v.vehicle.label,
                route_id: v.trip.route_id,
                direction_id: v.trip.direction_id,
                lat: v.position.latitude,
                lon: v.position.longitude,
                bearing: v.position.bearing,
                current_status: v.current_status,
                occupancy: v.occupancy_status,
                trip_id: v.trip.trip_id,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Trip updates feed
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TripUpdateFeed {
    #[serde(deserialize_with = "de_null_default")]
    pub entity: Vec<TripUpdateEntity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripUpdateEntity {
    #[serde(deserialize_with = "de_null_default")]
    pub id: String,
    pub trip_update: Option<TripUpdateBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripUpdateBody {
    #[serde(deserialize_with = "de_null_default")]
    pub trip: TripDescriptor,
    #[serde(deserialize_with = "de_null_default")]
    pub stop_time_update: Vec<StopTimeUpdateBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StopTimeUpdateBody {
    #[serde(deserialize_with = "de_null_default")]
    pub stop_id: String,
    pub arrival: Option<StopTimeEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StopTimeEvent {
    #[serde(deserialize_with = "de_lenient_i64")]
    pub time: i64,
}

impl StopTimeUpdateBody {
    /// Arrival time, or the epoch when the update carries no arrival.
    fn arrival_time(&self) -> i64 {
        self.arrival.as_ref().map_or(0, |event| event.time)
    }
}

impl TripUpdateFeed {
    /// Flattens every entity carrying a trip update, preserving the order of
    /// entities and of stop-time updates within each entity.
    pub fn into_trip_updates(self) -> Vec<TripUpdate> {
        self.entity
            .into_iter()
            .filter_map(|e| e.trip_update)
            .map(|u| TripUpdate {
                stop_time_updates: u
                    .stop_time_update
                    .iter()
                    .map(|s| StopTimeUpdate {
                        stop_id: s.stop_id.clone(),
                        arrival: s.arrival_time(),
                    })
                    .collect(),
                trip_id: u.trip.trip_id,
            })
            .collect()
    }
}
