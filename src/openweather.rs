//! OpenWeather current-weather, air-pollution and UV documents, and a thin
//! client that builds their URLs.

use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

/// `GET /weather` response, reduced to the fields the dashboard shows.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WeatherDocument {
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub main: MainReadings,
    pub visibility: i64,
    pub wind: Wind,
    pub rain: Rain,
    pub clouds: Clouds,
    pub sys: Sys,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Wind {
    /// m/s with `units=metric`
    pub speed: f64,
    pub deg: i64,
}

/// Present only when it rained recently.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Rain {
    #[serde(rename = "1h")]
    pub one_hour: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Clouds {
    pub all: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// `GET /air_pollution` response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AirPollution {
    pub list: Vec<AirPollutionSample>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AirPollutionSample {
    pub main: AirQualityCategory,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AirQualityCategory {
    /// 1 (good) to 5 (very poor)
    pub aqi: i32,
}

impl AirPollution {
    /// Category of the first sample, if any.
    pub fn category(&self) -> Option<i32> {
        self.list.first().map(|sample| sample.main.aqi)
    }
}

/// `GET /uvi` response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UvIndex {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

/// OpenWeather endpoints behind `base_url`. The API key is expected to be
/// added by `client` (see [`UrlParam`](crate::fetch::auth::UrlParam)).
#[derive(Clone)]
pub struct OpenWeather<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> OpenWeather<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        Ok(Url::parse_with_params(
            &format!("{}/{}", self.base_url, path),
            params,
        )?)
    }

    /// Current conditions for `city`, in metric units.
    #[instrument(skip(self))]
    pub async fn current(&self, city: &str) -> Result<WeatherDocument, FetchError> {
        let url = self.endpoint(
            "weather",
            &[("q", city.to_string()), ("units", "metric".to_string())],
        )?;
        fetch_json(&self.client, url).await
    }

    #[instrument(skip(self))]
    pub async fn air_pollution(&self, coord: Coord) -> Result<AirPollution, FetchError> {
        let url = self.endpoint("air_pollution", &coord_params(coord))?;
        fetch_json(&self.client, url).await
    }

    #[instrument(skip(self))]
    pub async fn uv_index(&self, coord: Coord) -> Result<UvIndex, FetchError> {
        let url = self.endpoint("uvi", &coord_params(coord))?;
        fetch_json(&self.client, url).await
    }
}

fn coord_params(coord: Coord) -> [(&'static str, String); 2] {
    [
        ("lat", format!("{:.6}", coord.lat)),
        ("lon", format!("{:.6}", coord.lon)),
    ]
}
