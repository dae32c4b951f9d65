use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};

/// RapidAPI host of the football statistics API, sent as a header with every
/// stats request.
pub const API_HOST: &str = "api-football-v1.p.rapidapi.com";

const DEFAULT_LEAGUE_STORE: &str = "memory/leagues.json";
const DEFAULT_IMAGES_DIR: &str = "images";

#[derive(Debug, Clone)]
pub struct Config {
    pub tele_token: String,
    pub rapidapi_token: String,
    pub league_store: PathBuf,
    pub images_dir: PathBuf,
}

impl Config {
    /// Read configuration from the environment (after dotenvy has loaded
    /// `.env`). The messaging token is mandatory. The stats token is not:
    /// without it every stats request is rejected upstream and the bot
    /// apologizes instead of serving data, which is still a useful mode for
    /// poking at the conversation flow.
    pub fn from_env() -> Result<Self> {
        let Some(tele_token) = opt_env("TELE_TOKEN") else {
            bail!("TELE_TOKEN is not set; the bot cannot reach the messaging gateway");
        };
        let rapidapi_token = opt_env("RAPIDAPI_TOKEN").unwrap_or_else(|| {
            log::warn!("RAPIDAPI_TOKEN is not set; statistics requests will fail");
            String::new()
        });
        let league_store = opt_env("FOOTBOT_LEAGUE_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEAGUE_STORE));
        let images_dir = opt_env("FOOTBOT_IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR));

        Ok(Self {
            tele_token,
            rapidapi_token,
            league_store,
            images_dir,
        })
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
