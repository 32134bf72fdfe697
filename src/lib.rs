//! Turns a free-text mood description into a single track recommendation.
//!
//! The text is classified by an x.ai chat completion into a one-word mood,
//! which is then used as a Spotify catalog search query. One of the returned
//! tracks is picked at random.

pub mod config;
pub mod error;
pub mod http;
pub mod recommend;
pub mod render;
pub mod spotify;
pub mod xai;

#[cfg(test)]
mod test_support;

pub use config::{load_config, Config, SpotifyConfig, XaiConfig};
pub use error::MoodTuneError;
pub use http::{HttpTransport, ReqwestTransport};
pub use recommend::Recommender;
pub use render::{HtmlPresenter, Presenter, TerminalPresenter, View};
pub use spotify::Track;

pub type Result<T> = std::result::Result<T, MoodTuneError>;
