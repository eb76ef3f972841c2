use reqwest::{self, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{collections::HashMap, sync::Arc, time::Duration};
use thiserror::Error;

use crate::constants;

// Shared HTTP client instance.
lazy_static::lazy_static! {
    static ref CLIENT: Arc<reqwest::Client> = Arc::new(reqwest::Client::new());
}

/// Custom error type for HTTP requests.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP error: {0} ({1}). Response body: {2}")]
    HttpError(reqwest::Url, u16, String),
    #[error("Error deserializing JSON: {0}")]
    JsonError(String),
    #[error("Other error: {0}")]
    Other(String),
}

// Builds a GET request on the shared client. Every request carries the timeout.
fn request(
    path: &str,
    params: HashMap<&str, &str>,
    headers: HashMap<&str, &str>,
) -> Result<RequestBuilder, RequestError> {
    // Construct the URL.
    let url = if !params.is_empty() {
        reqwest::Url::parse_with_params(path, &params)
            .map_err(|e| RequestError::Other(e.to_string()))?
    } else {
        reqwest::Url::parse(path).map_err(|e| RequestError::Other(e.to_string()))?
    };

    let mut req = CLIENT
        .get(url.as_str())
        .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS));
    for (k, v) in headers {
        req = req.header(k, v);
    }
    Ok(req)
}

/// Makes a GET request to the specified url with optional parameters.
pub async fn get<T: DeserializeOwned>(
    path: &str,                   // Absolute url.
    params: HashMap<&str, &str>,  // Optional query parameters.
    headers: HashMap<&str, &str>, // Optional header parameters.
) -> Result<T, RequestError> {
    let response = request(path, params, headers)?
        .send()
        .await
        .map_err(|e| RequestError::Other(e.to_string()))?;

    // Get the response status code.
    let status = response.status();

    // Handle non-success status codes.
    if !status.is_success() {
        let url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Other(e.to_string()))?;
        return Err(RequestError::HttpError(url, status.as_u16(), body));
    }

    // Deserialize the JSON response.
    response
        .json()
        .await
        .map_err(|e| RequestError::JsonError(e.to_string()))
}
