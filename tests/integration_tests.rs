//! End-to-end: mocked upstream APIs → router on an ephemeral port → reqwest.

use std::path::PathBuf;
use std::sync::Arc;

use mockito::{Matcher, ServerGuard};
use serde_json::{Value, json};

use city_dashboard::config::Config;
use city_dashboard::join::format_eta;
use city_dashboard::server::{self, AppState};
use city_dashboard::stops::StopDirectory;

const T0: i64 = 1_725_000_000;
const T1: i64 = 1_725_000_600;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn config(upstream: &ServerGuard, api_key: Option<&str>) -> Config {
    Config {
        bind: "127.0.0.1".to_string(),
        port: 0,
        stops_file: temp_path("city_dashboard_it_stops.txt"),
        static_dir: temp_path("city_dashboard_it_static"),
        template: temp_path("city_dashboard_it_missing_template.html"),
        vehicle_positions_url: format!("{}/gtfs-rt/vehicle-positions.json", upstream.url()),
        trip_updates_url: format!("{}/gtfs-rt/trip-updates.json", upstream.url()),
        openweather_url: format!("{}/data/2.5", upstream.url()),
        openweather_api_key: api_key.map(str::to_string),
        default_city: "Rouen".to_string(),
    }
}

/// Starts the app and returns its base URL.
async fn spawn_app(config: Config, stops: StopDirectory) -> String {
    let state = Arc::new(AppState::from_config(&config, stops).unwrap());
    let app = server::router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, app, std::future::pending()));

    format!("http://{addr}")
}

async fn get(url: String) -> (u16, String, String) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    (status, content_type, resp.text().await.unwrap())
}

async fn get_json(url: String) -> (u16, Value) {
    let (status, content_type, body) = get(url).await;
    assert_eq!(content_type, "application/json", "body: {body}");
    (status, serde_json::from_str(&body).unwrap())
}

fn vehicle_positions() -> String {
    json!({
        "header": {"gtfsRealtimeVersion": "2.0", "timestamp": "1725000000"},
        "entity": [{
            "id": "vp-1",
            "vehicle": {
                "trip": {"tripId": "T1", "routeId": "F1", "directionId": 0},
                "position": {"latitude": 49.4431, "longitude": 1.0993, "bearing": 90},
                "currentStatus": "IN_TRANSIT_TO",
                "occupancyStatus": "MANY_SEATS_AVAILABLE",
                "vehicle": {"id": "812", "label": "Bus42"}
            }
        }]
    })
    .to_string()
}

fn trip_updates() -> String {
    json!({
        "entity": [{
            "id": "tu-1",
            "tripUpdate": {
                "trip": {"tripId": "T1"},
                "stopTimeUpdate": [
                    {"stopId": "S1", "arrival": {"time": T0.to_string()}},
                    {"stopId": "S2", "arrival": {"time": T1}}
                ]
            }
        }]
    })
    .to_string()
}

async fn mock_transit(server: &mut ServerGuard, trip_updates_status: usize) {
    server
        .mock("GET", "/gtfs-rt/vehicle-positions.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(vehicle_positions())
        .create_async()
        .await;
    server
        .mock("GET", "/gtfs-rt/trip-updates.json")
        .with_status(trip_updates_status)
        .with_header("content-type", "application/json")
        .with_body(trip_updates())
        .create_async()
        .await;
}

fn rouen_weather() -> String {
    json!({
        "coord": {"lon": 1.0993, "lat": 49.4431},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 14.5, "feels_like": 13.9, "temp_min": 12.0, "temp_max": 15.8, "pressure": 1009, "humidity": 88},
        "visibility": 8000,
        "wind": {"speed": 10.0, "deg": 200},
        "clouds": {"all": 100},
        "sys": {"country": "FR", "sunrise": 1725002400, "sunset": 1725050400},
        "name": "Rouen"
    })
    .to_string()
}

fn central_stops() -> StopDirectory {
    [("S1", "Central")].into_iter().collect()
}

#[tokio::test]
async fn crime_and_events_are_fixed() {
    let upstream = mockito::Server::new_async().await;
    let base = spawn_app(config(&upstream, None), StopDirectory::default()).await;

    let (status, crime) = get_json(format!("{base}/api/crime")).await;
    assert_eq!(status, 200);
    assert_eq!(crime.as_array().unwrap().len(), 2);
    assert_eq!(crime[0]["type"], "Theft");
    assert_eq!(crime[1]["severity"], 4);

    let (_, again) = get_json(format!("{base}/api/crime?city=Paris&limit=1")).await;
    assert_eq!(crime, again);

    let (status, events) = get_json(format!("{base}/api/events?anything=1")).await;
    assert_eq!(status, 200);
    assert_eq!(events.as_array().unwrap().len(), 2);
    assert_eq!(events[1]["name"], "Food Festival");
}

#[tokio::test]
async fn transport_joins_positions_with_trip_updates() {
    let mut upstream = mockito::Server::new_async().await;
    mock_transit(&mut upstream, 200).await;
    let base = spawn_app(config(&upstream, None), central_stops()).await;

    let (status, body) = get_json(format!("{base}/api/transport")).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!([{
            "id": "812",
            "label": "Bus42",
            "route_id": "F1",
            "direction_id": 0,
            "lat": 49.4431,
            "lon": 1.0993,
            "bearing": 90,
            "current_status": "IN_TRANSIT_TO",
            "occupancy": "MANY_SEATS_AVAILABLE",
            "next_stops": [
                {"stop_id": "Central", "eta": format_eta(T0)},
                {"stop_id": "S2", "eta": format_eta(T1)}
            ]
        }])
    );
}

#[tokio::test]
async fn transport_label_filter() {
    let mut upstream = mockito::Server::new_async().await;
    mock_transit(&mut upstream, 200).await;
    let base = spawn_app(config(&upstream, None), central_stops()).await;

    let (_, filtered_out) = get_json(format!("{base}/api/transport?label=zz")).await;
    assert_eq!(filtered_out, json!([]));

    let (_, matched) = get_json(format!("{base}/api/transport?label=bUs4")).await;
    assert_eq!(matched.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn transport_without_trip_updates_serves_empty_next_stops() {
    let mut upstream = mockito::Server::new_async().await;
    mock_transit(&mut upstream, 500).await;
    let base = spawn_app(config(&upstream, None), central_stops()).await;

    let (status, body) = get_json(format!("{base}/api/transport")).await;

    assert_eq!(status, 200);
    assert_eq!(body[0]["label"], "Bus42");
    assert_eq!(body[0]["next_stops"], json!([]));
}

#[tokio::test]
async fn transport_fails_when_vehicle_positions_fail() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/gtfs-rt/vehicle-positions.json")
        .with_status(503)
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, None), central_stops()).await;

    let (status, content_type, body) = get(format!("{base}/api/transport")).await;

    assert_eq!(status, 500);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, "Failed to fetch vehicle positions: API returned status 503");
}

#[tokio::test]
async fn weather_reports_current_conditions_for_default_city() {
    let mut upstream = mockito::Server::new_async().await;
    let m = upstream
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Rouen".into()),
            Matcher::UrlEncoded("units".into(), "metric".into()),
            Matcher::UrlEncoded("appid".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_body(rouen_weather())
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, Some("test-key")), StopDirectory::default()).await;

    let (status, body) = get_json(format!("{base}/api/weather?city=")).await;

    assert_eq!(status, 200);
    assert_eq!(body["city"], "Rouen");
    assert_eq!(body["conditions"], json!(["light rain"]));
    assert_eq!(body["rain_1h"], 0.0);
    assert_eq!(body["sunset"], 1725050400);
    m.assert_async().await;
}

#[tokio::test]
async fn weather_upstream_404_is_a_json_500() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"cod":"404","message":"city not found"}"#)
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, Some("test-key")), StopDirectory::default()).await;

    let (status, body) = get_json(format!("{base}/api/weather?city=Atlantis")).await;

    assert_eq!(status, 500);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to fetch weather data"), "{error}");
    assert!(error.contains("404"), "{error}");
}

#[tokio::test]
async fn weather_without_api_key_fails_before_fetching() {
    let mut upstream = mockito::Server::new_async().await;
    let m = upstream
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, None), StopDirectory::default()).await;

    for route in ["/api/weather", "/api/weather/comprehensive"] {
        let (status, body) = get_json(format!("{base}{route}")).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({"error": "API key not configured"}));
    }
    m.assert_async().await;
}

#[tokio::test]
async fn comprehensive_weather_degrades_when_air_quality_fails() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(rouen_weather())
        .create_async()
        .await;
    upstream
        .mock("GET", "/data/2.5/air_pollution")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    upstream
        .mock("GET", "/data/2.5/uvi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"lat": 49.4431, "lon": 1.0993, "value": 3.5}"#)
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, Some("test-key")), StopDirectory::default()).await;

    let (status, body) = get_json(format!("{base}/api/weather/comprehensive")).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({"weather": {"wind_speed": 36.0}, "air_quality": {"aqi": 0}, "uv_index": 3.5})
    );
}

#[tokio::test]
async fn comprehensive_weather_converts_aqi() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(rouen_weather())
        .create_async()
        .await;
    let air = upstream
        .mock("GET", "/data/2.5/air_pollution")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "49.443100".into()),
            Matcher::UrlEncoded("lon".into(), "1.099300".into()),
            Matcher::UrlEncoded("appid".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"list": [{"main": {"aqi": 4}, "components": {"pm2_5": 40.1}}]}"#)
        .create_async()
        .await;
    upstream
        .mock("GET", "/data/2.5/uvi")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, Some("test-key")), StopDirectory::default()).await;

    let (status, body) = get_json(format!("{base}/api/weather/comprehensive?city=Rouen")).await;

    assert_eq!(status, 200);
    assert_eq!(body["air_quality"]["aqi"], 175);
    assert_eq!(body["uv_index"], 0.0);
    air.assert_async().await;
}

#[tokio::test]
async fn comprehensive_weather_primary_failure_is_a_json_500() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, Some("bad-key")), StopDirectory::default()).await;

    let (status, body) = get_json(format!("{base}/api/weather/comprehensive")).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Failed to fetch weather data"}));
}

#[tokio::test]
async fn dashboard_and_static_assets() {
    let upstream = mockito::Server::new_async().await;

    let static_dir = temp_path("city_dashboard_it_static_assets");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("script.js"), "console.log('ok');").unwrap();
    let template = temp_path("city_dashboard_it_dashboard.html");
    std::fs::write(&template, "<html><body>dashboard</body></html>").unwrap();

    let mut cfg = config(&upstream, None);
    cfg.static_dir = static_dir.clone();
    cfg.template = template.clone();
    let base = spawn_app(cfg, StopDirectory::default()).await;

    let (status, content_type, body) = get(format!("{base}/")).await;
    assert_eq!(status, 200);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("dashboard"));

    let (status, _, body) = get(format!("{base}/static/script.js")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "console.log('ok');");

    let (status, _, _) = get(format!("{base}/static/missing.js")).await;
    assert_eq!(status, 404);

    let (status, _, body) = get(format!("{base}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "OK\n");

    std::fs::remove_file(&template).unwrap();
    std::fs::remove_dir_all(&static_dir).unwrap();
}

#[tokio::test]
async fn dashboard_without_template_is_a_text_500() {
    let upstream = mockito::Server::new_async().await;
    let base = spawn_app(config(&upstream, None), StopDirectory::default()).await;

    let (status, content_type, body) = get(format!("{base}/")).await;

    assert_eq!(status, 500);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, "Error loading template");
}

#[tokio::test]
async fn repeated_query_keys_use_the_first_value() {
    let mut upstream = mockito::Server::new_async().await;
    mock_transit(&mut upstream, 200).await;
    let weather = upstream
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Rouen".into()),
            Matcher::UrlEncoded("appid".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_body(rouen_weather())
        .create_async()
        .await;
    let base = spawn_app(config(&upstream, Some("test-key")), central_stops()).await;

    let (status, body) = get_json(format!("{base}/api/transport?label=bus&label=zz")).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get_json(format!("{base}/api/transport?label=zz&label=bus")).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));

    let (status, body) = get_json(format!("{base}/api/weather?city=Rouen&city=Paris")).await;
    assert_eq!(status, 200);
    assert_eq!(body["city"], "Rouen");
    weather.assert_async().await;
}
