use oauth2::http::header::{HeaderValue, CONTENT_TYPE};
use oauth2::http::{HeaderMap, StatusCode};
use serde_json::json;
use std::sync::Mutex;

use crate::config::{Config, SpotifyConfig, XaiConfig};
use crate::http::{HttpRequest, HttpResponse};
use crate::render::{Presenter, View};

pub const TOKEN_BODY: &str =
    r#"{"access_token":"spotify-token","token_type":"bearer","expires_in":3600}"#;

pub fn test_config() -> Config {
    Config {
        spotify: SpotifyConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            ..SpotifyConfig::default()
        },
        xai: XaiConfig {
            api_key: "xai-key".to_string(),
            ..XaiConfig::default()
        },
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    HttpResponse {
        status_code: StatusCode::from_u16(status).unwrap(),
        headers,
        body: body.as_bytes().to_vec(),
    }
}

/// Builds a search body from `(name, artist, url)` triples.
pub fn search_body(items: &[(&str, &str, &str)]) -> String {
    let items: Vec<_> = items
        .iter()
        .map(|(name, artist, url)| {
            json!({
                "name": name,
                "artists": [{ "name": artist }],
                "external_urls": { "spotify": url },
            })
        })
        .collect();
    json!({ "tracks": { "items": items } }).to_string()
}

pub fn chat_body(content: &str) -> String {
    json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

pub fn is_token_request(request: &HttpRequest) -> bool {
    request.url.path() == "/api/token"
}

pub fn is_search_request(request: &HttpRequest) -> bool {
    request.url.path() == "/v1/search"
}

pub fn is_chat_request(request: &HttpRequest) -> bool {
    request.url.path() == "/v1/chat/completions"
}

pub fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(&request.body).unwrap()
}

/// Remembers every view it is asked to show, in order.
#[derive(Default)]
pub struct RecordingPresenter {
    views: Mutex<Vec<View>>,
}

impl RecordingPresenter {
    pub fn views(&self) -> Vec<View> {
        self.views.lock().unwrap().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, view: &View) {
        self.views.lock().unwrap().push(view.clone());
    }
}
