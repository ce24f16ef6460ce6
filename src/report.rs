//! Response bodies for the dashboard API and the pure transformations that
//! build them from upstream documents.

use serde::Serialize;

use crate::aqi;
use crate::openweather::{AirPollution, UvIndex, WeatherDocument};

const MS_TO_KMH: f64 = 3.6;

/// `/api/weather` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub conditions: Vec<String>,
    pub wind_speed: f64,
    pub wind_deg: i64,
    pub visibility: i64,
    pub rain_1h: f64,
    pub clouds: i64,
    pub sunrise: i64,
    pub sunset: i64,
}

impl From<&WeatherDocument> for WeatherReport {
    fn from(doc: &WeatherDocument) -> Self {
        WeatherReport {
            city: doc.name.clone(),
            lat: doc.coord.lat,
            lon: doc.coord.lon,
            temperature: doc.main.temp,
            feels_like: doc.main.feels_like,
            temp_min: doc.main.temp_min,
            temp_max: doc.main.temp_max,
            pressure: doc.main.pressure,
            humidity: doc.main.humidity,
            conditions: doc.weather.iter().map(|c| c.description.clone()).collect(),
            wind_speed: doc.wind.speed,
            wind_deg: doc.wind.deg,
            visibility: doc.visibility,
            rain_1h: doc.rain.one_hour,
            clouds: doc.clouds.all,
            sunrise: doc.sys.sunrise,
            sunset: doc.sys.sunset,
        }
    }
}

/// `/api/weather/comprehensive` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComprehensiveWeather {
    pub weather: WindSummary,
    pub air_quality: AirQuality,
    pub uv_index: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WindSummary {
    /// km/h
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AirQuality {
    /// 0–300 standard scale, 0 when no sample was available.
    pub aqi: i32,
}

impl ComprehensiveWeather {
    /// Air quality and UV are optional; a missing document leaves its field at zero.
    pub fn assemble(
        weather: &WeatherDocument,
        air: Option<&AirPollution>,
        uv: Option<&UvIndex>,
    ) -> Self {
        ComprehensiveWeather {
            weather: WindSummary {
                wind_speed: weather.wind.speed * MS_TO_KMH,
            },
            air_quality: AirQuality {
                aqi: air
                    .and_then(AirPollution::category)
                    .map_or(0, aqi::to_standard_scale),
            },
            uv_index: uv.map_or(0.0, |uv| uv.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crime {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub date: String,
    /// 1–5
    pub severity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub location: String,
    pub date: String,
    pub description: String,
}

/// Fixed demo records served by `/api/crime`.
pub fn crime_reports() -> Vec<Crime> {
    let crime = |kind: &str, location: &str, date: &str, severity| Crime {
        kind: kind.to_string(),
        location: location.to_string(),
        date: date.to_string(),
        severity,
    };
    vec![
        crime("Theft", "Main Street", "2025-09-02", 3),
        crime("Assault", "Central Park", "2025-09-01", 4),
    ]
}

/// Fixed demo records served by `/api/events`.
pub fn city_events() -> Vec<Event> {
    let event = |name: &str, location: &str, date: &str, description: &str| Event {
        name: name.to_string(),
        location: location.to_string(),
        date: date.to_string(),
        description: description.to_string(),
    };
    vec![
        event("Concert", "City Hall", "2025-09-05", "Jazz evening"),
        event("Food Festival", "Market Square", "2025-09-10", "Local delicacies"),
    ]
}
