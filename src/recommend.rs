use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::http::HttpTransport;
use crate::render::{Presenter, View, GENERIC_ERROR};
use crate::spotify::data::find_track;
use crate::spotify::SpotifyClient;
use crate::xai::data::classify_mood;
use crate::xai::XaiClient;
use crate::Result;

/// Runs the classify-then-search chain and publishes each step to a presenter.
///
/// Calls may overlap. Each call takes a new generation number, and a call that
/// has been overtaken by a newer one stops publishing and skips its remaining
/// network stages.
pub struct Recommender {
    xai: XaiClient,
    spotify: SpotifyClient,
    rng: Mutex<StdRng>,
    generation: RequestGeneration,
}

/// Request counter. Starting a request and drawing a view take the same lock,
/// so a superseded request can never draw after a newer one has begun.
#[derive(Default)]
struct RequestGeneration {
    current: std::sync::Mutex<u64>,
}

impl RequestGeneration {
    fn begin(&self) -> u64 {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += 1;
        *current
    }

    /// Runs `draw` only while `ticket` is the newest request, else returns the newest.
    fn draw_if_current<F: FnOnce()>(&self, ticket: u64, draw: F) -> std::result::Result<(), u64> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != ticket {
            return Err(*current);
        }
        draw();
        Ok(())
    }
}

impl Recommender {
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_rng(config, transport, StdRng::from_entropy())
    }

    pub fn with_rng(config: Config, transport: Arc<dyn HttpTransport>, rng: StdRng) -> Self {
        Self {
            xai: XaiClient::new(transport.clone(), config.xai),
            spotify: SpotifyClient::new(transport, config.spotify),
            rng: Mutex::new(rng),
            generation: RequestGeneration::default(),
        }
    }

    /// Returns the final view, or `None` if a newer call superseded this one.
    pub async fn recommend(&self, input: &str, presenter: &dyn Presenter) -> Option<View> {
        let generation = self.generation.begin();

        if input.trim().is_empty() {
            return self.publish(generation, presenter, View::Prompt);
        }

        self.publish(generation, presenter, View::Thinking)?;

        let view = match self.classify_and_search(generation, input, presenter).await {
            Ok(Some(view)) => view,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Recommendation failed: {}", e);
                View::Error {
                    message: GENERIC_ERROR.to_string(),
                }
            }
        };

        self.publish(generation, presenter, view)
    }

    async fn classify_and_search(
        &self,
        generation: u64,
        input: &str,
        presenter: &dyn Presenter,
    ) -> Result<Option<View>> {
        let mood = classify_mood(&self.xai, input).await?;

        let searching = View::Searching { mood: mood.clone() };
        if self.publish(generation, presenter, searching).is_none() {
            return Ok(None);
        }

        let view = match find_track(&self.spotify, &mood, &self.rng).await? {
            Some(track) => {
                log::info!("Recommending '{}' by {}", track.name, track.artist);
                View::Found { mood, track }
            }
            None => View::NotFound { mood },
        };
        Ok(Some(view))
    }

    fn publish(&self, generation: u64, presenter: &dyn Presenter, view: View) -> Option<View> {
        match self
            .generation
            .draw_if_current(generation, || presenter.present(&view))
        {
            Ok(()) => Some(view),
            Err(current) => {
                log::debug!(
                    "Dropping {:?} from request {} superseded by {}",
                    view,
                    generation,
                    current
                );
                None
            }
        }
    }
}
