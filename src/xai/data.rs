use oauth2::http::header::{HeaderValue, CONTENT_TYPE};
use oauth2::http::Method;
use oauth2::url::Url;
use serde::{Deserialize, Serialize};

use crate::error::MoodTuneError;
use crate::http::{bearer_headers, check_status, decode_json, HttpRequest};
use crate::xai::XaiClient;
use crate::Result;

const SERVICE: &str = "X.AI";

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 10;

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

fn shape_error(detail: &str) -> MoodTuneError {
    MoodTuneError::Shape {
        service: SERVICE,
        detail: detail.to_string(),
    }
}

/// Asks the model for a one-word mood and returns it trimmed, otherwise untouched.
pub async fn classify_mood(client: &XaiClient, user_input: &str) -> Result<String> {
    let payload = ChatCompletionRequest {
        model: &client.config.model,
        messages: [
            ChatMessage {
                role: "system",
                content: &client.config.system_prompt,
            },
            ChatMessage {
                role: "user",
                content: user_input,
            },
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };

    let mut headers = bearer_headers(&client.config.api_key)?;
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let body = serde_json::to_vec(&payload)?;

    let request = HttpRequest {
        url: Url::parse(&client.config.endpoint)?,
        method: Method::POST,
        headers,
        body,
    };

    log::debug!("Sending mood classification request to {}", client.config.endpoint);
    let response = client.transport.execute(request).await?;
    log::debug!("X.AI responded with {}", response.status_code);

    let body = check_status(SERVICE, response)?;
    log::debug!("X.AI raw response: {}", String::from_utf8_lossy(&body));

    let response: ChatCompletionResponse = decode_json(SERVICE, &body)?;
    let choice = response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .ok_or_else(|| shape_error("response has no choices"))?;
    let message = choice
        .message
        .ok_or_else(|| shape_error("first choice has no message"))?;
    let content = message
        .content
        .ok_or_else(|| shape_error("message has no content"))?;

    let mood = content.trim().to_string();
    if mood.split_whitespace().count() > 1 {
        log::warn!("Model returned more than one word, using it verbatim: '{}'", mood);
    }
    log::info!("Detected mood: {}", mood);

    Ok(mood)
}
