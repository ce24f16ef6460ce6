//! Upstream JSON fetcher.
//!
//! Every endpoint goes through [`fetch_json`]: a single GET, no retry, no
//! caching, with failures classified into [`FetchError`] so that each call
//! site can decide whether the failure is fatal.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// GETs `url` through `client` and decodes the body as `T`.
///
/// Anything but `200 OK` is reported as [`FetchError::HttpStatus`].
pub async fn fetch_json<C, T>(client: &C, url: Url) -> Result<T, FetchError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "upstream body received");
    Ok(serde_json::from_slice(&bytes)?)
}
