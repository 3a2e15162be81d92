//! Reading CSV/GeoJSON sources from disk or HTTP.
//!
//! A source is either a local path or an `http(s)://` URL. Sources ending
//! in `.gz` are gunzipped before decoding as UTF-8.

use anyhow::{bail, Context};
use flate2::read::GzDecoder;
use std::io::Read;
use std::time::Duration;

const HTTP_TIMEOUT_SECS: u64 = 60;

pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn is_gzip(location: &str) -> bool {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.to_lowercase().ends_with(".gz")
}

/// Decode raw source bytes, gunzipping when `location` names a `.gz` file.
pub fn decode_bytes(location: &str, bytes: &[u8]) -> anyhow::Result<String> {
    if is_gzip(location) {
        let mut text = String::new();
        GzDecoder::new(bytes)
            .read_to_string(&mut text)
            .with_context(|| format!("failed to gunzip {}", location))?;
        return Ok(text);
    }
    let text = String::from_utf8(bytes.to_vec())
        .with_context(|| format!("{} is not valid UTF-8", location))?;
    Ok(text)
}

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;
    if !response.status().is_success() {
        bail!("bad response for {}: {}", url, response.status());
    }
    Ok(response.bytes().await?.to_vec())
}

/// Read a source into a string.
pub async fn read_source(location: &str) -> anyhow::Result<String> {
    let bytes = if is_url(location) {
        fetch_bytes(location).await?
    } else {
        tokio::fs::read(location)
            .await
            .with_context(|| format!("failed to read {}", location))?
    };
    log::info!("[TWX] source: read {} bytes from {}", bytes.len(), location);
    decode_bytes(location, &bytes)
}
