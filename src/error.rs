use thiserror::Error;

use crate::http::TransportError;

/// Errors raised while classifying a mood or searching for a track.
///
/// None of these are shown to the end user verbatim. The orchestrator logs them
/// and publishes a single generic message instead.
#[derive(Error, Debug)]
pub enum MoodTuneError {
    /// The remote service answered with a status outside the 2xx range.
    #[error("{service} responded with status {status}: {body}")]
    Network {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("failed to decode {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The response was valid JSON but lacked the expected fields.
    #[error("unexpected {service} response shape: {detail}")]
    Shape {
        service: &'static str,
        detail: String,
    },

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// The client-credentials exchange was rejected or could not be completed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] oauth2::http::header::InvalidHeaderValue),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to write config file: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
