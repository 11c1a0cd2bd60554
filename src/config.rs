// src/config.rs
//! Environment-backed service configuration.
//!
//! Everything the original deployment tuned through `.env` lands here once at
//! startup; the candidate roster and the domain allow-list are plain fields
//! so tests can inject fixed tables instead of the seeded defaults.

use anyhow::{bail, Result};
use std::time::Duration;

pub const ENV_API_KEY: &str = "NEWSAPI_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_BASE_URL: &str = "NEWSAPI_URL";
pub const ENV_RANKING_DELAY_MS: &str = "RANKING_DELAY_MS";

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_RANKING_DELAY_MS: u64 = 1000;

/// The placeholder shipped in `.env.example`; treated the same as no key.
const PLACEHOLDER_API_KEY: &str = "tu_api_key_aqui";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub base_url: String,
    /// Pause between sequential upstream calls in the ranking loop.
    pub ranking_delay: Duration,
    pub candidates: Vec<String>,
    pub domains: Vec<String>,
}

impl AppConfig {
    /// Build from the process environment. Fails (and the process refuses to
    /// start) when the upstream API key is missing or still the placeholder.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        if api_key.trim().is_empty() || api_key == PLACEHOLDER_API_KEY {
            bail!(
                "{ENV_API_KEY} is not configured; create a .env file with {ENV_API_KEY}=<your key>"
            );
        }

        let port = std::env::var(ENV_PORT)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let allowed_origins = std::env::var(ENV_ALLOWED_ORIGINS)
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(default_origins);

        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let ranking_delay = Duration::from_millis(
            std::env::var(ENV_RANKING_DELAY_MS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RANKING_DELAY_MS),
        );

        Ok(Self {
            api_key,
            port,
            allowed_origins,
            base_url,
            ranking_delay,
            candidates: default_candidates(),
            domains: default_domains(),
        })
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5500".to_string(),
    ]
}

/// The 8 monitored candidates, in roster order. Ranking ties keep this order.
pub fn default_candidates() -> Vec<String> {
    [
        "Evelyn Matthei",
        "José Antonio Kast",
        "Johannes Kaiser",
        "Franco Parisi",
        "Marco Enríquez-Ominami",
        "Harold Mayne-Nicholls",
        "Jeannette Jara",
        "Eduardo Artés",
    ]
    .map(String::from)
    .to_vec()
}

/// Chilean outlet domains for the domain-scoped primary query.
pub fn default_domains() -> Vec<String> {
    [
        "latercera.com",
        "emol.com",
        "biobiochile.cl",
        "cooperativa.cl",
        "t13.cl",
        "tvn.cl",
        "meganoticias.cl",
        "chvnoticias.cl",
        "df.cl",
        "elmostrador.cl",
    ]
    .map(String::from)
    .to_vec()
}
