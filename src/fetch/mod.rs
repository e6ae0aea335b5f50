//! Dataset retrieval.
//!
//! [`Retriever`] fetches a resource by name. [`HttpRetriever`] resolves the
//! name against a base URL through any [`HttpClient`]; [`FileRetriever`]
//! reads it from a local directory.

mod basic;
mod client;
mod retriever;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use retriever::{FileRetriever, HttpRetriever, Retriever};

use tracing::debug;

use crate::error::{LoadError, Result};

/// GETs `url` and returns the body.
///
/// Any non-2xx status is an error carrying the status code; the body of such
/// a response is discarded.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed = reqwest::Url::parse(url).map_err(|e| LoadError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(url, status = status.as_u16(), "Dataset response received");

    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    Ok(resp.bytes().await?.to_vec())
}
