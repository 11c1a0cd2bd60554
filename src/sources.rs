//! # Source Catalog
//!
//! Configurable mapping from Chilean news outlets to a media category
//! (press / tv / radio) and a quality weight used by the scoring engine.
//!
//! - Loads from TOML config (category lists + weights).
//! - Category match is a case-insensitive substring check against the list
//!   names, evaluated in press → tv → radio order; first match wins, with
//!   `Other` as the fallback.
//! - Weight lookup is an exact-name match with a configurable default for
//!   unlisted outlets.
//! - Includes a built-in `default_seed()` with the monitored outlets, used
//!   whenever no config file is found.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";

fn default_default_weight() -> f64 {
    0.8
}

/// Media category of an outlet. Declaration order is the classification
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Press,
    Tv,
    Radio,
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryLists {
    #[serde(default)]
    pub press: Vec<String>,
    #[serde(default)]
    pub tv: Vec<String>,
    #[serde(default)]
    pub radio: Vec<String>,
}

/// Category lists and per-outlet quality weights, loaded from TOML or seeded.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceCatalog {
    /// Weight applied to outlets not present in `weights`.
    #[serde(default = "default_default_weight")]
    pub default_weight: f64,
    #[serde(default)]
    pub categories: CategoryLists,
    /// Exact-name weights for known outlets.
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

impl SourceCatalog {
    /// Load from a TOML file, falling back to `default_seed()` on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Load using `$SCORING_CONFIG_PATH`, then the default path, then the seed.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_SCORING_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_SCORING_CONFIG_PATH.to_string());
        Self::load_from_file(path)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Classify an outlet by case-insensitive substring match against the
    /// category lists, in priority order.
    pub fn classify(&self, source: &str) -> MediaCategory {
        let lower = source.to_lowercase();
        let hit = |names: &[String]| {
            names
                .iter()
                .any(|n| lower.contains(n.to_lowercase().as_str()))
        };
        if hit(&self.categories.press) {
            MediaCategory::Press
        } else if hit(&self.categories.tv) {
            MediaCategory::Tv
        } else if hit(&self.categories.radio) {
            MediaCategory::Radio
        } else {
            MediaCategory::Other
        }
    }

    /// Quality weight for an outlet: exact name match, else the default.
    pub fn weight_for(&self, source: &str) -> f64 {
        self.weights
            .get(source)
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Built-in seed with the monitored Chilean outlets.
    pub fn default_seed() -> Self {
        let categories = CategoryLists {
            press: [
                "La Tercera",
                "El Mercurio",
                "Emol",
                "BioBioChile",
                "Cooperativa",
                "El Mostrador",
                "DF",
            ]
            .map(String::from)
            .to_vec(),
            tv: ["T13", "TVN", "Mega", "CHV", "CNN Chile"]
                .map(String::from)
                .to_vec(),
            radio: ["BioBioChile", "Cooperativa", "ADN Radio"]
                .map(String::from)
                .to_vec(),
        };

        let mut weights = HashMap::new();
        for (name, w) in [
            ("La Tercera", 1.2),
            ("El Mercurio", 1.2),
            ("Emol", 1.2),
            ("T13", 1.1),
            ("TVN", 1.1),
            ("CNN Chile", 1.1),
            ("El Mostrador", 1.0),
            ("BioBioChile", 1.0),
            ("Cooperativa", 1.0),
        ] {
            weights.insert(name.to_string(), w);
        }

        Self {
            default_weight: 0.8,
            categories,
            weights,
        }
    }
}
