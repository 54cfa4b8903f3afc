use std::{str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_WEB_URL: &str = "http://localhost:5173";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub volume: u8,
    pub volume_step: u8,
    pub seek_step_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            volume_step: 5,
            seek_step_secs: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub web_url: String,
    pub token: Option<String>,
    pub feed_page_size: u32,
    pub poll_secs: u64,
    pub cache_ttl_secs: u64,
    pub audio: AudioConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            token: None,
            feed_page_size: 10,
            poll_secs: 30,
            cache_ttl_secs: 300,
            audio: AudioConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let volume: u32 = parse(&lookup, "TUNELINK_VOLUME", defaults.audio.volume.into())?;
        let volume = u8::try_from(volume)
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(|| ConfigError::Invalid {
                key: "TUNELINK_VOLUME",
                value: volume.to_string(),
            })?;
        let audio = AudioConfig {
            volume,
            ..AudioConfig::default()
        };

        let feed_page_size = parse(&lookup, "TUNELINK_FEED_PAGE_SIZE", defaults.feed_page_size)?;
        if feed_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "TUNELINK_FEED_PAGE_SIZE",
                value: "0".to_string(),
            });
        }

        let poll_secs = parse(&lookup, "TUNELINK_POLL_SECS", defaults.poll_secs)?;
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "TUNELINK_POLL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_url: non_empty("TUNELINK_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            web_url: non_empty("TUNELINK_WEB_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.web_url),
            token: non_empty("TUNELINK_TOKEN"),
            feed_page_size,
            poll_secs,
            cache_ttl_secs: parse(&lookup, "TUNELINK_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            audio,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value: raw })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.feed_page_size, 10);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert!(config.token.is_none());
    }

    #[test]
    fn reads_overrides_and_trims_urls() {
        let config = Config::from_lookup(lookup(&[
            ("TUNELINK_API_URL", "https://api.example.com/"),
            ("TUNELINK_TOKEN", "abc"),
            ("TUNELINK_FEED_PAGE_SIZE", "25"),
            ("TUNELINK_VOLUME", "60"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.feed_page_size, 25);
        assert_eq!(config.audio.volume, 60);
    }

    #[test]
    fn volume_above_full_is_rejected() {
        for raw in ["101", "250", "300"] {
            let err = Config::from_lookup(lookup(&[("TUNELINK_VOLUME", raw)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    key: "TUNELINK_VOLUME",
                    value: raw.to_string()
                }
            );
        }
        let config = Config::from_lookup(lookup(&[("TUNELINK_VOLUME", "100")])).unwrap();
        assert_eq!(config.audio.volume, 100);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = Config::from_lookup(lookup(&[("TUNELINK_POLL_SECS", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "TUNELINK_POLL_SECS",
                value: "soon".to_string()
            }
        );
        assert!(Config::from_lookup(lookup(&[("TUNELINK_POLL_SECS", "0")])).is_err());
    }
}
