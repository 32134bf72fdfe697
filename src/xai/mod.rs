pub mod data;

use std::sync::Arc;

use crate::config::XaiConfig;
use crate::http::HttpTransport;

/// Chat-completion client used to turn free text into a mood label.
pub struct XaiClient {
    pub transport: Arc<dyn HttpTransport>,
    pub config: XaiConfig,
}

impl XaiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: XaiConfig) -> Self {
        Self { transport, config }
    }
}
