//! Shared HTTP plumbing for synchronous entry points.
//!
//! Remote resources (catalog config, background images, font files) are
//! fetched with a shared reqwest client driven by a dedicated current-thread
//! tokio runtime, so callers keep a plain synchronous API.

use crate::error::{SignError, SignResult};
use lazy_static::lazy_static;
use reqwest::{Client, StatusCode};
use std::time::Duration;

static SIGNCRAFT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

lazy_static! {
    static ref NET_TOKIO_RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
    static ref REQWEST_CLIENT: Client = reqwest::ClientBuilder::new()
        .user_agent(SIGNCRAFT_USER_AGENT)
        .build()
        .expect("Failed to construct reqwest client");
}

/// Fetch raw bytes from an http(s) URL with a bounded timeout.
pub fn fetch_bytes(url: &str, timeout: Duration) -> SignResult<Vec<u8>> {
    log::debug!(target: "net", "GET {}", url);
    NET_TOKIO_RUNTIME.block_on(async {
        let response = REQWEST_CLIENT
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| SignError::Http(format!("{}: {}", url, e)))?;

        match response.status() {
            StatusCode::OK => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| SignError::Http(format!("{}: {}", url, e))),
            status => Err(SignError::Http(format!(
                "{} returned status {}",
                url, status
            ))),
        }
    })
}

/// Fetch and decode a JSON document from an http(s) URL.
pub fn fetch_json(url: &str, timeout: Duration) -> SignResult<serde_json::Value> {
    let bytes = fetch_bytes(url, timeout)?;
    Ok(serde_json::from_slice(&bytes)?)
}
