use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use teloxide::types::UserId;

use crate::error::Error;
use crate::new_order::DELIVERY_FEE;
use crate::product::Product;

/// Everything the bot reads at startup
///
/// Loaded from a JSON file, every field has a default so a missing
/// file or a partial one is fine.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File holding the Telegram bot token
    pub token_file: PathBuf,

    pub redis_url: String,

    /// Flat fee added to every order, cents
    pub delivery_fee: u64,

    /// How often order tracking re-fetches the order
    pub poll_interval_secs: u64,

    /// When order tracking gives up on an order that doesn't move
    pub track_timeout_secs: u64,

    /// Identity groups and their members, e.g. `"admin": [12345]`
    pub groups: BTreeMap<String, Vec<UserId>>,

    /// Catalog the store starts with
    pub products: Vec<Product>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token_file:         PathBuf::from("key"),
            redis_url:          "redis://127.0.0.1/".to_string(),
            delivery_fee:       DELIVERY_FEE,
            poll_interval_secs: 30,
            track_timeout_secs: 3 * 60 * 60,
            groups:             BTreeMap::new(),
            products:           Vec::new(),
        }
    }
}

impl Config {
    pub const PATH_ENV: &'static str = "CAMPUS_QUICK_CONFIG";
    pub const DEFAULT_PATH: &'static str = "config.json";

    /// Reads config from `$CAMPUS_QUICK_CONFIG` or `config.json`,
    /// then applies environment overrides
    pub fn load() -> Result<Config, Error> {
        let path = std::env::var(Self::PATH_ENV)
            .unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());
        let mut config = Self::from_path(path)?;
        if let Ok(url) = std::env::var("REDIS_URL") {
            config.redis_url = url;
        }
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("No config at {}, using defaults", path.display());
            return Ok(Config::default())
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)
            .map_err(|e| format!("bad config {}: {e}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// `TELOXIDE_TOKEN` if set, otherwise contents of `token_file`
    pub fn bot_token(&self) -> Result<String, Error> {
        if let Ok(token) = std::env::var("TELOXIDE_TOKEN") {
            return Ok(token)
        }
        let token = std::fs::read_to_string(&self.token_file)
            .map_err(|e| format!("could not read token file {}: {e}",
                                 self.token_file.display()))?;
        Ok(token.trim().to_string())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Never shorter than one poll interval
    pub fn track_timeout(&self) -> Duration {
        Duration::from_secs(self.track_timeout_secs).max(self.poll_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(PathBuf::from("key"), config.token_file);
        assert_eq!(200, config.delivery_fee);
        assert_eq!(Duration::from_secs(30), config.poll_interval());
        assert!(config.groups.is_empty());
        assert!(config.products.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(r#"{
            "token_file": "/run/secrets/bot",
            "redis_url": "redis://cache:6379/",
            "delivery_fee": 250,
            "poll_interval_secs": 10,
            "groups": { "admin": [1], "runner": [2, 3] },
            "products": [
                { "productId": "prod_001", "name": "Noodles", "price": 150, "stock": 4 }
            ]
        }"#).unwrap();

        assert_eq!("redis://cache:6379/", config.redis_url);
        assert_eq!(250, config.delivery_fee);
        assert_eq!(Duration::from_secs(10), config.poll_interval());
        assert_eq!(Some(&vec![UserId(2), UserId(3)]), config.groups.get("runner"));
        assert_eq!("Noodles", config.products[0].name);
        assert_eq!(None, config.products[0].category);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = Config::from_json(r#"{ "poll_interval_secs": 0 }"#).unwrap();
        assert_eq!(Duration::from_secs(1), config.poll_interval());
    }

    #[test]
    fn test_track_timeout_is_at_least_one_poll() {
        let config = Config::from_json(r#"{ "track_timeout_secs": 0 }"#).unwrap();
        assert_eq!(Duration::from_secs(30), config.track_timeout());

        let config = Config::from_json("{}").unwrap();
        assert_eq!(Duration::from_secs(3 * 60 * 60), config.track_timeout());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::from_path("/definitely/not/here.json").unwrap();
        assert_eq!(30, config.poll_interval_secs);
    }
}
