use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use pct_str::{PctString, URIReserved};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proxy used to fetch calendar feeds that do not send CORS headers.
pub const DEFAULT_CORS_URL: &str = "https://api.allorigins.win/raw?url=%s";

/// Where the feed comes from and which view renders it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TtvConfig {
    pub ical_href: Option<String>,
    pub view_id: Option<String>,
    /// Fetch template; `%s` is replaced by the percent-encoded feed address.
    pub cors_url: String,
    pub views_dir: PathBuf,
}

impl Default for TtvConfig {
    fn default() -> Self {
        Self {
            ical_href: None,
            view_id: None,
            cors_url: DEFAULT_CORS_URL.to_string(),
            views_dir: PathBuf::from("views"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    #[diagnostic(code(config::not_found), help("Create a 'ttv.toml' file or pass --config"))]
    NotFound(PathBuf),

    #[error("failed to parse config: {0}")]
    #[diagnostic(code(config::parse_error))]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    #[diagnostic(code(config::serialize_error))]
    Serialize(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    #[diagnostic(code(config::io_error))]
    Io(#[from] io::Error),
}

impl TtvConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io(err),
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The proxied address the feed is fetched from, if a feed is set.
    pub fn feed_url(&self) -> Option<String> {
        let href = self.ical_href.as_deref()?;
        let encoded = PctString::encode(href.chars(), URIReserved).to_string();
        Some(self.cors_url.replacen("%s", &encoded, 1))
    }

    /// `<views_dir>/<id>.json`
    pub fn view_path(&self, id: &str) -> PathBuf {
        self.views_dir.join(format!("{id}.json"))
    }

    /// `<views_dir>/<id>.css`
    pub fn stylesheet_path(&self, id: &str) -> PathBuf {
        self.views_dir.join(format!("{id}.css"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TtvConfig::default();
        assert_eq!(config.cors_url, DEFAULT_CORS_URL);
        assert_eq!(config.feed_url(), None);
        assert_eq!(config.view_path("uni"), PathBuf::from("views").join("uni.json"));
        assert_eq!(config.stylesheet_path("uni"), PathBuf::from("views").join("uni.css"));
    }

    #[test]
    fn feed_url_encodes_the_feed_address() {
        let config = TtvConfig {
            ical_href: Some("https://cal.example.edu/feed.ics?u=1&k=2".to_string()),
            ..TtvConfig::default()
        };
        assert_eq!(
            config.feed_url().as_deref(),
            Some(
                "https://api.allorigins.win/raw?url=\
                 https%3A%2F%2Fcal.example.edu%2Ffeed.ics%3Fu%3D1%26k%3D2"
            )
        );
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: TtvConfig = toml::from_str("view_id = \"uni\"").expect("valid toml");
        assert_eq!(config.view_id.as_deref(), Some("uni"));
        assert_eq!(config.cors_url, DEFAULT_CORS_URL);
        assert_eq!(config.views_dir, PathBuf::from("views"));
    }
}
