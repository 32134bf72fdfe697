pub mod auth;
pub mod data;

use std::sync::Arc;

use crate::config::SpotifyConfig;
use crate::http::HttpTransport;

pub use data::Track;

pub struct SpotifyClient {
    pub transport: Arc<dyn HttpTransport>,
    pub config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: SpotifyConfig) -> Self {
        Self { transport, config }
    }
}
