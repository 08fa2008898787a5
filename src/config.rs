use color_eyre::eyre::{eyre, Result, WrapErr};
use reqwest::Url;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILE: &str = "diary_client.log";
pub const DEFAULT_LOG_FILTER: &str = "diary_client=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = value("DIARY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let parsed = Url::parse(api_url.trim())
            .wrap_err_with(|| format!("DIARY_API_URL is not a valid URL: {api_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(eyre!(
                "DIARY_API_URL must use http or https, got `{}`",
                parsed.scheme()
            ));
        }

        Ok(Config {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            log_file: value("DIARY_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            log_filter: value("DIARY_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }
}
