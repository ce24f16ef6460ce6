//! Error types shared by the upstream fetcher and the HTTP handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure of a single upstream GET + decode.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    HttpStatus(u16),

    #[error("invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Status code reported by the upstream, if the failure was a non-200 reply.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Request-level failures, rendered as `500` responses.
///
/// Weather routes answer with a JSON `{"error": ...}` body; the transport
/// route and the dashboard page answer in plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Failed to fetch weather data: {0}")]
    Weather(#[source] FetchError),

    /// Same failure as [`ApiError::Weather`], reported without the detail.
    #[error("Failed to fetch weather data")]
    WeatherUnavailable(#[source] FetchError),

    #[error("Failed to fetch vehicle positions: {0}")]
    VehiclePositions(#[source] FetchError),

    #[error("Error loading template")]
    Template(#[source] std::io::Error),
}

impl ApiError {
    fn is_json(&self) -> bool {
        matches!(
            self,
            ApiError::MissingApiKey | ApiError::Weather(_) | ApiError::WeatherUnavailable(_)
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match std::error::Error::source(&self) {
            Some(source) => error!(error = %self, cause = %source, "request failed"),
            None => error!(error = %self, "request failed"),
        }

        let message = self.to_string();
        if self.is_json() {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response()
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message_carries_code() {
        let err = FetchError::HttpStatus(404);
        assert_eq!(err.to_string(), "API returned status 404");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_decode_error_has_no_status() {
        let err: FetchError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(err.status().is_none());
        assert!(err.to_string().starts_with("invalid JSON payload"));
    }

    #[test]
    fn test_weather_errors_render_as_json() {
        let resp = ApiError::Weather(FetchError::HttpStatus(404)).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json"
        );
    }

    #[test]
    fn test_transport_errors_render_as_text() {
        let err = ApiError::VehiclePositions(FetchError::HttpStatus(502));
        assert_eq!(
            err.to_string(),
            "Failed to fetch vehicle positions: API returned status 502"
        );
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            resp.headers()["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
    }
}
