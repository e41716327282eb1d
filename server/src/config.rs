use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "web";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_KEY must be set to a YouTube Data API key")]
    MissingApiKey,

    #[error("PORT '{0}' is not a valid port number")]
    InvalidPort(String),
}

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub api_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            port,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            api_base_url: lookup("YOUTUBE_API_BASE_URL")
                .unwrap_or_else(|| youtube_client::DEFAULT_BASE_URL.to_string()),
        })
    }
}
