//! Upstream NewsAPI search client.
//!
//! API: `https://newsapi.org/v2/everything`
//! Auth: API key via `apiKey` query param. Free tier: 100 req/day.
//!
//! The primary query is scoped to the configured Chilean outlet domains; a
//! paid-tier rejection (HTTP 426) retries as a general `"<name> Chile"`
//! query without the domain filter. Every other failure degrades to the
//! zeroed result; callers never see an error from this client.

use anyhow::bail;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::model::{Article, SearchResults, SourceBucket};

const LANGUAGE: &str = "es";
const SORT_BY: &str = "publishedAt";
/// NewsAPI maximum page size; a single page is all we ever fetch.
const PAGE_SIZE: u32 = 100;
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    domains: String,
}

/// Internal fetch outcome; 426 is the one upstream failure that is not
/// swallowed immediately.
enum Fetch {
    Results(SearchResults),
    PaidTierRequired,
}

impl NewsApiClient {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            domains: cfg.domains.join(","),
        }
    }

    /// Search mentions of a candidate. Infallible: upstream failures come
    /// back as the zeroed "no mentions found" result.
    pub async fn search(
        &self,
        candidate: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> SearchResults {
        info!(candidate, "searching NewsAPI");
        match self.fetch(candidate, from, to, true).await {
            Ok(Fetch::Results(results)) => {
                info!(
                    candidate,
                    total = results.total_results,
                    fetched = results.articles_count,
                    sources = results.articles_by_source.len(),
                    "NewsAPI search done"
                );
                results
            }
            Ok(Fetch::PaidTierRequired) => {
                warn!(
                    candidate,
                    "domain-scoped search needs a paid plan (426); retrying without domain filter"
                );
                self.search_general(candidate, from, to).await
            }
            Err(e) => {
                warn!(candidate, error = %e, "NewsAPI search failed");
                SearchResults::default()
            }
        }
    }

    /// Fallback: `"<candidate> Chile"` with no domain restriction.
    async fn search_general(
        &self,
        candidate: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> SearchResults {
        let query = format!("{candidate} Chile");
        match self.fetch(&query, from, to, false).await {
            Ok(Fetch::Results(results)) => results,
            Ok(Fetch::PaidTierRequired) => {
                warn!(candidate, "general search also rejected with 426");
                SearchResults::default()
            }
            Err(e) => {
                warn!(candidate, error = %e, "general NewsAPI search failed");
                SearchResults::default()
            }
        }
    }

    async fn fetch(
        &self,
        query: &str,
        from: Option<&str>,
        to: Option<&str>,
        restrict_domains: bool,
    ) -> anyhow::Result<Fetch> {
        let now = Utc::now();
        let default_from = (now - Duration::days(DEFAULT_WINDOW_DAYS)).to_rfc3339();
        let default_to = now.to_rfc3339();

        let mut params: Vec<(&str, String)> = vec![
            ("apiKey", self.api_key.clone()),
            ("q", query.to_string()),
            ("language", LANGUAGE.to_string()),
            ("sortBy", SORT_BY.to_string()),
            ("pageSize", PAGE_SIZE.to_string()),
            ("from", from.map(str::to_string).unwrap_or(default_from)),
            ("to", to.map(str::to_string).unwrap_or(default_to)),
        ];
        if restrict_domains {
            params.push(("domains", self.domains.clone()));
        }

        let resp = self.http.get(&self.base_url).query(&params).send().await?;
        if resp.status() == StatusCode::UPGRADE_REQUIRED {
            return Ok(Fetch::PaidTierRequired);
        }
        if !resp.status().is_success() {
            bail!("unexpected upstream status {}", resp.status());
        }

        let body: WireResponse = resp.json().await?;
        if body.status != "ok" {
            bail!(
                "upstream error: {}",
                body.message.unwrap_or_else(|| "unknown".to_string())
            );
        }

        Ok(Fetch::Results(assemble(body)))
    }
}

/* ----------------------------
Wire types & assembly
---------------------------- */

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    status: String,
    message: Option<String>,
    #[serde(default, rename = "totalResults")]
    total_results: u64,
    #[serde(default)]
    articles: Vec<WireArticle>,
}

#[derive(Debug, Deserialize)]
struct WireArticle {
    source: Option<WireSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSource {
    name: Option<String>,
}

fn assemble(body: WireResponse) -> SearchResults {
    let mut all_articles = Vec::with_capacity(body.articles.len());
    let mut pairs = Vec::with_capacity(body.articles.len());

    for wire in body.articles {
        let source_name = wire
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string());
        let article = Article {
            title: wire.title,
            description: wire.description,
            url: wire.url,
            published_at: wire.published_at,
            author: wire.author,
            url_to_image: wire.url_to_image,
        };
        all_articles.push(article.clone());
        pairs.push((source_name, article));
    }

    SearchResults {
        total_results: body.total_results,
        articles_count: all_articles.len(),
        articles_by_source: group_by_source(pairs),
        all_articles,
    }
}

/// Bucket articles by source name: first-seen source order, arrival order
/// within each bucket.
fn group_by_source(pairs: Vec<(String, Article)>) -> Vec<SourceBucket> {
    let mut buckets: Vec<SourceBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (name, article) in pairs {
        match index.get(&name) {
            Some(&i) => buckets[i].articles.push(article),
            None => {
                index.insert(name.clone(), buckets.len());
                buckets.push(SourceBucket {
                    name,
                    articles: vec![article],
                });
            }
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "La Tercera"},
                "author": "Redacción",
                "title": "Jara lidera la encuesta",
                "description": "La candidata sube en intención de voto",
                "url": "https://www.latercera.com/nota-1",
                "urlToImage": "https://www.latercera.com/img-1.jpg",
                "publishedAt": "2025-10-19T10:00:00Z"
            },
            {
                "source": {"id": "t13", "name": "T13"},
                "author": null,
                "title": "Debate presidencial",
                "description": null,
                "url": "https://www.t13.cl/nota-2",
                "urlToImage": null,
                "publishedAt": "2025-10-18T08:30:00Z"
            },
            {
                "source": {"id": null, "name": "La Tercera"},
                "author": null,
                "title": "Segunda nota",
                "description": null,
                "url": "https://www.latercera.com/nota-3",
                "urlToImage": null,
                "publishedAt": "2025-10-17T12:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn wire_parse_tolerates_nulls_and_assembles_buckets() {
        let body: WireResponse = serde_json::from_str(FIXTURE).expect("parse fixture");
        let results = assemble(body);

        assert_eq!(results.total_results, 3);
        assert_eq!(results.articles_count, 3);
        assert_eq!(results.all_articles.len(), 3);

        // First-seen source order, arrival order within buckets.
        assert_eq!(results.articles_by_source.len(), 2);
        assert_eq!(results.articles_by_source[0].name, "La Tercera");
        assert_eq!(results.articles_by_source[0].articles.len(), 2);
        assert_eq!(
            results.articles_by_source[0].articles[1].title.as_deref(),
            Some("Segunda nota")
        );
        assert_eq!(results.articles_by_source[1].name, "T13");
    }

    #[test]
    fn missing_source_name_becomes_unknown() {
        let body: WireResponse = serde_json::from_str(
            r#"{"status":"ok","totalResults":1,"articles":[
                {"source":null,"title":"Nota","description":null,"url":null,
                 "urlToImage":null,"publishedAt":null,"author":null}]}"#,
        )
        .expect("parse");
        let results = assemble(body);
        assert_eq!(results.articles_by_source[0].name, "Unknown");
    }

    #[test]
    fn grouping_preserves_order() {
        let a = |t: &str| Article {
            title: Some(t.to_string()),
            ..Article::default()
        };
        let buckets = group_by_source(vec![
            ("Emol".to_string(), a("1")),
            ("TVN".to_string(), a("2")),
            ("Emol".to_string(), a("3")),
            ("Cooperativa".to_string(), a("4")),
        ]);
        let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Emol", "TVN", "Cooperativa"]);
        assert_eq!(buckets[0].articles[0].title.as_deref(), Some("1"));
        assert_eq!(buckets[0].articles[1].title.as_deref(), Some("3"));
    }
}
