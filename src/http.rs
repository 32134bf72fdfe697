use async_trait::async_trait;
use oauth2::http::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use oauth2::http::HeaderMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::MoodTuneError;
use crate::Result;

pub use oauth2::{HttpRequest, HttpResponse};

/// Failure to get any response at all (DNS, connect, TLS, body read).
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self(error.to_string())
    }
}

/// Sends a single HTTP request and returns whatever the server answered.
///
/// Both the oauth2 token exchange and the catalog/chat calls go through this
/// trait, so a test can swap the whole network out with one mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> std::result::Result<Self, TransportError> {
        // Token endpoints must not follow redirects.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        log::debug!("{} {}", request.method, request.url);

        let response = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status_code = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}

pub(crate) fn bearer_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Returns the body of a 2xx response, or a `Network` error carrying status and body.
pub(crate) fn check_status(service: &'static str, response: HttpResponse) -> Result<Vec<u8>> {
    if response.status_code.is_success() {
        return Ok(response.body);
    }

    let body = String::from_utf8_lossy(&response.body).into_owned();
    log::error!("{} API error ({}): {}", service, response.status_code, body);
    Err(MoodTuneError::Network {
        service,
        status: response.status_code.as_u16(),
        body,
    })
}

/// Decodes in two steps so that "not JSON" and "JSON of the wrong shape" stay distinct.
pub(crate) fn decode_json<T: DeserializeOwned>(service: &'static str, body: &[u8]) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|source| MoodTuneError::Decode { service, source })?;

    serde_json::from_value(value).map_err(|e| MoodTuneError::Shape {
        service,
        detail: e.to_string(),
    })
}
