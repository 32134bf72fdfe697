use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::http::StatusCode;
use oauth2::{AccessToken, AuthUrl, ClientId, ClientSecret, RequestTokenError, TokenResponse, TokenUrl};

use crate::error::MoodTuneError;
use crate::http::TransportError;
use crate::spotify::SpotifyClient;
use crate::Result;

// Required by BasicClient even though the client-credentials flow never visits it.
const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

/// Trades the configured client id/secret for a bearer token.
///
/// Every call performs a fresh exchange; tokens are never cached or reused.
pub async fn request_access_token(client: &SpotifyClient) -> Result<AccessToken> {
    let oauth = BasicClient::new(
        ClientId::new(client.config.client_id.clone()),
        Some(ClientSecret::new(client.config.client_secret.clone())),
        AuthUrl::new(AUTHORIZE_URL.to_string())?,
        Some(TokenUrl::new(client.config.token_url.clone())?),
    );

    let mut status = None;
    let status_slot = &mut status;
    let token_result = oauth
        .exchange_client_credentials()
        .request_async(|request| async move {
            let response = client.transport.execute(request).await?;
            *status_slot = Some(response.status_code);
            Ok::<_, TransportError>(response)
        })
        .await;
    let token_result = token_result.map_err(|e| token_error(e, status))?;

    log::debug!("Obtained Spotify access token");
    Ok(token_result.access_token().clone())
}

fn token_error(
    error: RequestTokenError<TransportError, BasicErrorResponse>,
    status: Option<StatusCode>,
) -> MoodTuneError {
    let detail = match error {
        RequestTokenError::Request(e) => return MoodTuneError::Transport(e),
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Parse(e, body) => {
            format!("{}: {}", e, String::from_utf8_lossy(&body))
        }
        RequestTokenError::Other(msg) => msg,
    };
    let detail = match status {
        Some(status) => format!("HTTP {}: {}", status.as_u16(), detail),
        None => detail,
    };
    log::error!("Spotify token exchange failed: {}", detail);
    MoodTuneError::TokenExchange(detail)
}
