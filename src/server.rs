//! HTTP API and dashboard.
//!
//! Each request is handled on its own: the only state shared between requests
//! is the read-only [`AppState`], built once before the listener is bound.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Json, Router};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use tower_http::services::ServeDir;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, FetchError};
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, fetch_json};
use crate::join::{self, EnrichedVehicle};
use crate::openweather::OpenWeather;
use crate::report::{self, ComprehensiveWeather, Crime, Event, WeatherReport};
use crate::stops::StopDirectory;
use crate::transit::{TripUpdateFeed, VehicleFeed};

/// GTFS-RT JSON feeds of one network.
pub struct TransitFeeds {
    client: BasicClient,
    vehicle_positions: Url,
    trip_updates: Url,
}

impl TransitFeeds {
    pub fn new(client: BasicClient, vehicle_positions: Url, trip_updates: Url) -> Self {
        Self {
            client,
            vehicle_positions,
            trip_updates,
        }
    }

    pub async fn vehicle_positions(&self) -> Result<VehicleFeed, FetchError> {
        fetch_json(&self.client, self.vehicle_positions.clone()).await
    }

    pub async fn trip_updates(&self) -> Result<TripUpdateFeed, FetchError> {
        fetch_json(&self.client, self.trip_updates.clone()).await
    }
}

pub struct AppState {
    pub transit: TransitFeeds,
    /// `None` when no API key is configured.
    pub openweather: Option<OpenWeather<UrlParam<BasicClient>>>,
    pub stops: StopDirectory,
    pub template: PathBuf,
    pub default_city: String,
}

impl AppState {
    pub fn from_config(config: &Config, stops: StopDirectory) -> Result<Self> {
        let client = BasicClient::new();

        let vehicle_positions = Url::parse(&config.vehicle_positions_url)
            .with_context(|| format!("invalid vehicle positions URL {}", config.vehicle_positions_url))?;
        let trip_updates = Url::parse(&config.trip_updates_url)
            .with_context(|| format!("invalid trip updates URL {}", config.trip_updates_url))?;
        Url::parse(&config.openweather_url)
            .with_context(|| format!("invalid OpenWeather URL {}", config.openweather_url))?;

        let openweather = match config.openweather_api_key.as_deref() {
            Some(key) if !key.is_empty() => Some(OpenWeather::new(
                UrlParam::appid(client.clone(), key.to_string()),
                &config.openweather_url,
            )),
            _ => {
                warn!("OPENWEATHER_API_KEY is not set, weather routes will fail");
                None
            }
        };

        Ok(Self {
            transit: TransitFeeds::new(client, vehicle_positions, trip_updates),
            openweather,
            stops,
            template: config.template.clone(),
            default_city: config.default_city.clone(),
        })
    }

    fn openweather(&self) -> Result<&OpenWeather<UrlParam<BasicClient>>, ApiError> {
        self.openweather.as_ref().ok_or(ApiError::MissingApiKey)
    }

    fn city<'a>(&'a self, params: &'a QueryPairs) -> &'a str {
        match first_param(params, "city") {
            Some(city) if !city.is_empty() => city,
            _ => &self.default_city,
        }
    }
}

/// Builds the application router. `static_dir` is served under `/static`.
pub fn router(state: Arc<AppState>, static_dir: impl Into<PathBuf>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/crime", get(crime))
        .route("/api/events", get(events))
        .route("/api/transport", get(transport))
        .route("/api/weather", get(weather))
        .route("/api/weather/comprehensive", get(comprehensive_weather))
        .nest_service("/static", ServeDir::new(static_dir.into()))
        .with_state(state)
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Raw query pairs, in request order. Repeated keys are kept so the first
/// occurrence wins instead of the request being rejected.
pub type QueryPairs = Vec<(String, String)>;

/// First value of `key` in `params`.
pub fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn health() -> &'static str {
    "OK\n"
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let page = tokio::fs::read_to_string(&state.template)
        .await
        .map_err(ApiError::Template)?;
    Ok(Html(page))
}

async fn crime() -> Json<Vec<Crime>> {
    Json(report::crime_reports())
}

async fn events() -> Json<Vec<Event>> {
    Json(report::city_events())
}

#[instrument(skip(state))]
async fn transport(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<EnrichedVehicle>>, ApiError> {
    let vehicles = state
        .transit
        .vehicle_positions()
        .await
        .map_err(ApiError::VehiclePositions)?
        .into_positions();

    // Missing trip updates only cost the ETAs.
    let updates = state
        .transit
        .trip_updates()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "trip updates unavailable, serving vehicles without next stops");
            TripUpdateFeed::default()
        })
        .into_trip_updates();

    let label = first_param(&params, "label").unwrap_or_default();
    let enriched = join::join(&vehicles, &updates, label, &state.stops);
    info!(
        vehicles = vehicles.len(),
        trip_updates = updates.len(),
        matched = enriched.len(),
        "transport joined"
    );
    Ok(Json(enriched))
}

#[instrument(skip(state))]
async fn weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<WeatherReport>, ApiError> {
    let api = state.openweather()?;
    let doc = api
        .current(state.city(&params))
        .await
        .map_err(ApiError::Weather)?;
    Ok(Json(WeatherReport::from(&doc)))
}

#[instrument(skip(state))]
async fn comprehensive_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<ComprehensiveWeather>, ApiError> {
    let api = state.openweather()?;
    let doc = api
        .current(state.city(&params))
        .await
        .map_err(ApiError::WeatherUnavailable)?;

    let (air, uv) = tokio::join!(api.air_pollution(doc.coord), api.uv_index(doc.coord));

    // Both are optional: a failure leaves the field at zero.
    let air = air
        .inspect_err(|e| warn!(error = %e, "air quality unavailable"))
        .ok();
    let uv = uv
        .inspect_err(|e| warn!(error = %e, "UV index unavailable"))
        .ok();

    Ok(Json(ComprehensiveWeather::assemble(
        &doc,
        air.as_ref(),
        uv.as_ref(),
    )))
}
