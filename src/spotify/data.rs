use oauth2::http::Method;
use oauth2::url::Url;
use oauth2::AccessToken;
use rand::Rng;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::MoodTuneError;
use crate::http::{bearer_headers, check_status, decode_json, HttpRequest};
use crate::spotify::auth::request_access_token;
use crate::spotify::SpotifyClient;
use crate::Result;

const SERVICE: &str = "Spotify";

/// Number of search results requested per query.
pub const SEARCH_LIMIT: u32 = 10;

#[derive(Deserialize, Debug)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

// Items stay raw; only the one that gets picked is decoded.
#[derive(Deserialize, Debug)]
struct TrackPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrackItem {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub external_urls: ExternalUrls,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Artist {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ExternalUrls {
    pub spotify: String,
}

/// A single recommendation, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub url: String,
}

pub async fn search_tracks(
    client: &SpotifyClient,
    token: &AccessToken,
    query: &str,
) -> Result<Vec<serde_json::Value>> {
    let url = format!(
        "{}/search?q={}&type=track&limit={}",
        client.config.api_base.trim_end_matches('/'),
        urlencoding::encode(query),
        SEARCH_LIMIT
    );

    let request = HttpRequest {
        url: Url::parse(&url)?,
        method: Method::GET,
        headers: bearer_headers(token.secret())?,
        body: Vec::new(),
    };

    let response = client.transport.execute(request).await?;
    log::debug!("Spotify search responded with {}", response.status_code);

    let body = check_status(SERVICE, response)?;
    let response: SearchResponse = decode_json(SERVICE, &body)?;

    Ok(response.tracks.map(|page| page.items).unwrap_or_default())
}

/// Picks one item uniformly at random. No weighting by relevance rank.
///
/// Malformed entries elsewhere in the page are ignored; only the picked one
/// has to be a well-formed track.
pub fn pick_track<R: Rng + ?Sized>(
    items: Vec<serde_json::Value>,
    rng: &mut R,
) -> Result<Option<Track>> {
    if items.is_empty() {
        return Ok(None);
    }

    let index = rng.gen_range(0..items.len());
    let Some(raw) = items.into_iter().nth(index) else {
        return Ok(None);
    };

    let item: TrackItem = serde_json::from_value(raw).map_err(|e| MoodTuneError::Shape {
        service: SERVICE,
        detail: format!("search item {}: {}", index, e),
    })?;

    let artist = item
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .ok_or_else(|| MoodTuneError::Shape {
            service: SERVICE,
            detail: format!("track '{}' has no artists", item.name),
        })?;

    Ok(Some(Track {
        name: item.name,
        artist,
        url: item.external_urls.spotify,
    }))
}

/// Fresh token, search by mood, random pick. `None` when the search came back empty.
pub async fn find_track<R: Rng + Send>(
    client: &SpotifyClient,
    mood: &str,
    rng: &Mutex<R>,
) -> Result<Option<Track>> {
    let token = request_access_token(client).await?;
    let items = search_tracks(client, &token, mood).await?;
    log::info!("Spotify returned {} tracks for '{}'", items.len(), mood);

    let mut rng = rng.lock().await;
    pick_track(items, &mut *rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpTransport;
    use crate::test_support::{
        is_search_request, is_token_request, json_response, search_body, test_config, TOKEN_BODY,
    };
    use oauth2::http::header::AUTHORIZATION;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn item(name: &str) -> Value {
        json!({
            "name": name,
            "artists": [{ "name": format!("{name} artist") }],
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{name}") },
        })
    }

    // Always yields 0, so `gen_range(0..n)` always lands on the first item.
    fn first_pick() -> StepRng {
        StepRng::new(0, 0)
    }

    fn client_with(mock: MockHttpTransport) -> SpotifyClient {
        SpotifyClient::new(Arc::new(mock), test_config().spotify)
    }

    fn expect_token(mock: &mut MockHttpTransport, times: usize) {
        mock.expect_execute()
            .withf(is_token_request)
            .times(times)
            .returning(|_| Ok(json_response(200, TOKEN_BODY)));
    }

    #[test]
    fn pick_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_track(Vec::new(), &mut rng).unwrap(), None);
    }

    #[test]
    fn pick_maps_first_artist_and_link() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut only = item("solo");
        only["artists"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "name": "Featured" }));

        let track = pick_track(vec![only], &mut rng).unwrap().unwrap();
        assert_eq!(track.name, "solo");
        assert_eq!(track.artist, "solo artist");
        assert_eq!(track.url, "https://open.spotify.com/track/solo");
    }

    #[test]
    fn pick_without_artist_is_shape_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut lonely = item("nobody");
        lonely["artists"] = json!([]);

        let err = pick_track(vec![lonely], &mut rng).unwrap_err();
        assert!(matches!(err, MoodTuneError::Shape { .. }));
    }

    #[test]
    fn null_neighbour_does_not_spoil_a_good_pick() {
        let track = pick_track(vec![item("good"), Value::Null], &mut first_pick())
            .unwrap()
            .unwrap();
        assert_eq!(track.name, "good");
    }

    #[test]
    fn picking_a_null_item_is_shape_error() {
        let err = pick_track(vec![Value::Null, item("good")], &mut first_pick()).unwrap_err();
        assert!(matches!(err, MoodTuneError::Shape { .. }));
    }

    #[test]
    fn pick_is_uniform_over_results() {
        const N: usize = 5;
        const TRIALS: usize = 20_000;

        let items: Vec<Value> = (0..N).map(|i| item(&i.to_string())).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; N];

        for _ in 0..TRIALS {
            let track = pick_track(items.clone(), &mut rng).unwrap().unwrap();
            let index: usize = track.name.parse().unwrap();
            counts[index] += 1;
        }

        let expected = TRIALS / N;
        for (index, count) in counts.iter().enumerate() {
            let deviation = (*count as i64 - expected as i64).unsigned_abs() as usize;
            assert!(
                deviation < expected / 10,
                "index {index} picked {count} times, expected about {expected}"
            );
        }
    }

    #[tokio::test]
    async fn search_encodes_query_and_uses_bearer_token() {
        let mut mock = MockHttpTransport::new();
        mock.expect_execute()
            .withf(|req| {
                is_search_request(req)
                    && req.method == Method::GET
                    && req.url.query() == Some("q=feeling%20blue%20%26%20caf%C3%A9&type=track&limit=10")
                    && req.headers[AUTHORIZATION] == "Bearer spotify-token"
            })
            .times(1)
            .returning(|_| Ok(json_response(200, &search_body(&[("a", "b", "c")]))));

        let client = client_with(mock);
        let token = AccessToken::new("spotify-token".to_string());
        let items = search_tracks(&client, &token, "feeling blue & café").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "a");
    }

    #[tokio::test]
    async fn search_without_tracks_object_is_empty() {
        let mut mock = MockHttpTransport::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, "{}")));

        let client = client_with(mock);
        let token = AccessToken::new("t".to_string());
        assert!(search_tracks(&client, &token, "calm").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_non_json_is_decode_failure() {
        let mut mock = MockHttpTransport::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, "<html>oops</html>")));

        let client = client_with(mock);
        let token = AccessToken::new("t".to_string());
        let err = search_tracks(&client, &token, "calm").await.unwrap_err();
        assert!(matches!(err, MoodTuneError::Decode { service: "Spotify", .. }));
    }

    #[tokio::test]
    async fn search_error_status_carries_body() {
        let mut mock = MockHttpTransport::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(429, "slow down")));

        let client = client_with(mock);
        let token = AccessToken::new("t".to_string());
        let err = search_tracks(&client, &token, "calm").await.unwrap_err();
        match err {
            MoodTuneError::Network { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn page_with_null_item_still_yields_track() {
        let mut mock = MockHttpTransport::new();
        expect_token(&mut mock, 1);
        mock.expect_execute()
            .withf(is_search_request)
            .times(1)
            .returning(|_| {
                let body = json!({ "tracks": { "items": [item("good"), null] } });
                Ok(json_response(200, &body.to_string()))
            });

        let client = client_with(mock);
        let rng = Mutex::new(first_pick());
        let track = find_track(&client, "happy", &rng).await.unwrap().unwrap();
        assert_eq!(track.name, "good");
        assert_eq!(track.url, "https://open.spotify.com/track/good");
    }

    #[tokio::test]
    async fn each_search_runs_its_own_token_exchange() {
        let mut mock = MockHttpTransport::new();
        expect_token(&mut mock, 3);
        mock.expect_execute()
            .withf(is_search_request)
            .times(3)
            .returning(|_| Ok(json_response(200, &search_body(&[("song", "artist", "url")]))));

        let client = client_with(mock);
        let rng = Mutex::new(StdRng::seed_from_u64(1));
        for _ in 0..3 {
            let track = find_track(&client, "happy", &rng).await.unwrap();
            assert_eq!(track.map(|t| t.name), Some("song".to_string()));
        }
    }

    #[tokio::test]
    async fn failed_token_exchange_skips_search() {
        let mut mock = MockHttpTransport::new();
        mock.expect_execute()
            .withf(is_token_request)
            .times(1)
            .returning(|_| Ok(json_response(401, r#"{"error":"invalid_client"}"#)));

        let client = client_with(mock);
        let rng = Mutex::new(StdRng::seed_from_u64(1));
        let err = find_track(&client, "happy", &rng).await.unwrap_err();
        assert!(matches!(err, MoodTuneError::TokenExchange(_)));
    }
}
