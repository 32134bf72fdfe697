use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::MoodTuneError;
use crate::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a mood analysis assistant. \
Reply with a single word describing the user's mood, for example: happy, angry, sad. \
Do not add any explanation.";

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub xai: XaiConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_base: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct XaiConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub system_prompt: String,
}

impl Default for XaiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.x.ai/v1/chat/completions".to_string(),
            model: "grok-beta".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Environment values win over the file, but only when non-empty.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 4] = [
            ("SPOTIFY_CLIENT_ID", &mut self.spotify.client_id),
            ("SPOTIFY_CLIENT_SECRET", &mut self.spotify.client_secret),
            ("X_API_KEY", &mut self.xai.api_key),
            ("XAI_MODEL", &mut self.xai.model),
        ];

        for (key, field) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                log::debug!("Using {} from environment", key);
                *field = value;
            }
        }
    }

    /// Names of the secrets that are still empty.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.spotify.client_id.trim().is_empty() {
            missing.push("SPOTIFY_CLIENT_ID");
        }
        if self.spotify.client_secret.trim().is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET");
        }
        if self.xai.api_key.trim().is_empty() {
            missing.push("X_API_KEY");
        }
        missing
    }
}

/// Loads `.env`, then the TOML file at `path`, then environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    dotenv().ok();
    load_config_with(path, |key| std::env::var(key).ok())
}

pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let file_exists = path.exists();

    let mut config = if file_exists {
        let config_str = fs::read_to_string(path)?;
        Config::from_toml_str(&config_str)?
    } else {
        Config::default()
    };

    config.apply_env_overrides(lookup);

    let missing = config.missing_secrets();
    if missing.is_empty() {
        return Ok(config);
    }

    if !file_exists {
        let toml_string = toml::to_string_pretty(&Config::default())?;
        let mut file = fs::File::create(path)?;
        file.write_all(toml_string.as_bytes())?;

        return Err(MoodTuneError::Config(format!(
            "no credentials found. A default '{}' has been created; fill it in or set {}",
            path.display(),
            missing.join(", ")
        )));
    }

    Err(MoodTuneError::Config(format!(
        "missing credentials: {}",
        missing.join(", ")
    )))
}
