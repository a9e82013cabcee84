//! Single-shot HTTP requests with status validation.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::BootstrapError;

/// HTTP client used for every network call of a run.
///
/// Requests are never retried: any failure is fatal to the run.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        let response = self.get_ok(url).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Performs a GET request and buffers the whole body in memory.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET bytes from {}...", url);

        let response = self.get_ok(url).await?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        debug!("Downloaded {:.2} MB", body.len() as f64 / (1024.0 * 1024.0));
        Ok(body.to_vec())
    }

    /// Sends a GET and rejects every status other than 200 OK.
    async fn get_ok(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BootstrapError::Transfer {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }
        Ok(response)
    }
}
