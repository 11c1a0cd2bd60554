// src/model.rs
//! Domain types shared by the search client, scoring engine, and API layer.
//!
//! Serialized field names are camelCase to keep the JSON wire shape stable
//! for existing dashboard consumers.

use serde::{Deserialize, Serialize};

/// One upstream article, as returned by NewsAPI. Every field is nullable
/// upstream, so everything is optional here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub author: Option<String>,
    pub url_to_image: Option<String>,
}

/// Articles published by a single source, in upstream arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBucket {
    pub name: String,
    pub articles: Vec<Article>,
}

/// Outcome of one upstream search. `Default` is the zeroed "no mentions
/// found" result the client degrades to on failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub total_results: u64,
    pub articles_count: usize,
    pub articles_by_source: Vec<SourceBucket>,
    pub all_articles: Vec<Article>,
}

/// Compact representation of the most recent article of a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSnapshot {
    pub title: Option<String>,
    pub link: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl ArticleSnapshot {
    pub fn of(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            link: article.url.clone(),
            date: article.published_at.clone(),
            description: article.description.clone(),
            image: article.url_to_image.clone(),
        }
    }
}

/// Per-source aggregate inside one category bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub name: String,
    pub count: usize,
    pub score: i64,
    pub recent_article: Option<ArticleSnapshot>,
    /// Up to 5 sample articles, in bucket order.
    pub all_articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub title_mentions: u32,
    pub description_mentions: u32,
    pub recent_articles: u32,
    pub old_articles: u32,
    pub sentiment: SentimentTally,
    /// Average articles per day, formatted to 2 decimals.
    pub frequency: String,
}

/// Fully categorized, weighted result for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedResult {
    pub press: Vec<SourceSummary>,
    pub tv: Vec<SourceSummary>,
    pub radio: Vec<SourceSummary>,
    pub other: Vec<SourceSummary>,
    pub total: usize,
    pub weighted_score: i64,
    pub metrics: Metrics,
}

impl CategorizedResult {
    /// Source names per category, in bucket order.
    pub fn source_names(bucket: &[SourceSummary]) -> Vec<String> {
        bucket.iter().map(|s| s.name.clone()).collect()
    }
}
