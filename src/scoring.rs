//! # Scoring Engine
//! Pure, testable logic that maps `(source buckets, candidate, now)` →
//! `CategorizedResult`. No I/O, no mutation of inputs; the clock is a
//! parameter so scoring is deterministic under test.
//!
//! Per article the base score 1.0 is adjusted multiplicatively, in order:
//! title mention ×2, description mention ×1.3, recency tier (×1.5 / ×1.2 /
//! ×1.0), keyword sentiment (×1.2 / ×1.0 / ×0.9), source quality weight.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::{
    Article, ArticleSnapshot, CategorizedResult, Metrics, SourceBucket, SourceSummary,
};
use crate::sources::{MediaCategory, SourceCatalog};

/// Sample articles retained per source.
const SAMPLE_ARTICLES_PER_SOURCE: usize = 5;

static LEXICON: Lazy<SentimentLexicon> = Lazy::new(|| {
    serde_json::from_str(include_str!("../sentiment_lexicon.json"))
        .expect("valid sentiment lexicon")
});

/// Positive/negative keyword lists for the keyword-counting sentiment pass.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        LEXICON.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: SourceCatalog,
    lexicon: SentimentLexicon,
}

impl ScoringEngine {
    pub fn new(catalog: SourceCatalog) -> Self {
        Self {
            catalog,
            lexicon: SentimentLexicon::default(),
        }
    }

    pub fn with_lexicon(catalog: SourceCatalog, lexicon: SentimentLexicon) -> Self {
        Self { catalog, lexicon }
    }

    /// Categorize and weight one candidate's source buckets.
    ///
    /// `recent_article` is the first article of each bucket as supplied by
    /// the caller; this function does not re-sort.
    pub fn categorize(
        &self,
        buckets: &[SourceBucket],
        candidate: &str,
        now: DateTime<Utc>,
    ) -> CategorizedResult {
        let mut result = CategorizedResult::default();
        let mut total_weighted = 0.0f64;

        let full = candidate.to_lowercase();
        let last = candidate
            .split_whitespace()
            .last()
            .unwrap_or(candidate)
            .to_lowercase();

        for bucket in buckets {
            let category = self.catalog.classify(&bucket.name);
            let weight = self.catalog.weight_for(&bucket.name);

            let mut source_score = 0.0f64;
            for article in &bucket.articles {
                source_score +=
                    self.score_article(article, &full, &last, weight, now, &mut result.metrics);
            }

            let summary = SourceSummary {
                name: bucket.name.clone(),
                count: bucket.articles.len(),
                score: source_score.round() as i64,
                recent_article: bucket.articles.first().map(ArticleSnapshot::of),
                all_articles: bucket
                    .articles
                    .iter()
                    .take(SAMPLE_ARTICLES_PER_SOURCE)
                    .cloned()
                    .collect(),
            };

            match category {
                MediaCategory::Press => result.press.push(summary),
                MediaCategory::Tv => result.tv.push(summary),
                MediaCategory::Radio => result.radio.push(summary),
                MediaCategory::Other => result.other.push(summary),
            }

            result.total += bucket.articles.len();
            total_weighted += source_score;
        }

        // Average over a constant 30-day window, whatever span was requested.
        result.metrics.frequency = format!("{:.2}", result.total as f64 / 30.0);
        result.weighted_score = total_weighted.round() as i64;

        result
    }

    fn score_article(
        &self,
        article: &Article,
        full: &str,
        last: &str,
        weight: f64,
        now: DateTime<Utc>,
        metrics: &mut Metrics,
    ) -> f64 {
        let title = article.title.as_deref().unwrap_or("").to_lowercase();
        let description = article.description.as_deref().unwrap_or("").to_lowercase();

        let mut score = 1.0f64;

        // 1. Prominence in the title.
        if title.contains(full) || title.contains(last) {
            score *= 2.0;
            metrics.title_mentions += 1;
        }

        // 2. Mention in the description.
        if description.contains(full) || description.contains(last) {
            score *= 1.3;
            metrics.description_mentions += 1;
        }

        // 3. Recency tiers; unparseable dates count as old.
        match days_since(now, article.published_at.as_deref()) {
            Some(d) if d <= 7.0 => {
                score *= 1.5;
                metrics.recent_articles += 1;
            }
            Some(d) if d <= 14.0 => {
                score *= 1.2;
                metrics.old_articles += 1;
            }
            _ => {
                metrics.old_articles += 1;
            }
        }

        // 4. Keyword sentiment over title + description.
        let text = format!("{title} {description}");
        let positive = keywords_present(&self.lexicon.positive, &text);
        let negative = keywords_present(&self.lexicon.negative, &text);
        if positive > negative {
            score *= 1.2;
            metrics.sentiment.positive += 1;
        } else if negative > positive {
            score *= 0.9;
            metrics.sentiment.negative += 1;
        } else {
            metrics.sentiment.neutral += 1;
        }

        // 5. Source quality weight.
        score * weight
    }
}

/// Number of lexicon keywords present in `text` (each counted once).
fn keywords_present(keywords: &[String], text: &str) -> usize {
    keywords
        .iter()
        .filter(|w| text.contains(w.to_lowercase().as_str()))
        .count()
}

/// Fractional days between `now` and an RFC 3339 publish timestamp.
fn days_since(now: DateTime<Utc>, published_at: Option<&str>) -> Option<f64> {
    let published = DateTime::parse_from_rfc3339(published_at?).ok()?;
    Some((now - published.with_timezone(&Utc)).num_seconds() as f64 / 86_400.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap()
    }

    fn article(title: &str, description: &str, published: DateTime<Utc>) -> Article {
        Article {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            url: Some("https://example.cl/nota".to_string()),
            published_at: Some(published.to_rfc3339()),
            author: None,
            url_to_image: None,
        }
    }

    fn bucket(name: &str, articles: Vec<Article>) -> SourceBucket {
        SourceBucket {
            name: name.to_string(),
            articles,
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(SourceCatalog::default_seed())
    }

    #[test]
    fn scenario_title_recency_sentiment_and_weight_multiply() {
        let eng = engine();
        let now = fixed_now();
        let a = article("Jara lidera la encuesta", "", now);
        let mut metrics = Metrics::default();

        let raw = eng.score_article(&a, "jeannette jara", "jara", 1.2, now, &mut metrics);
        // 1 × 2 (title) × 1.5 (recent) × 1.2 (positive "lidera") × 1.2 (weight)
        assert!((raw - 4.32).abs() < 1e-9, "raw score was {raw}");
        assert_eq!(metrics.title_mentions, 1);
        assert_eq!(metrics.recent_articles, 1);
        assert_eq!(metrics.sentiment.positive, 1);

        let result = eng.categorize(
            &[bucket("La Tercera", vec![a])],
            "Jeannette Jara",
            now,
        );
        assert_eq!(result.press.len(), 1);
        assert_eq!(result.press[0].score, 4);
        assert_eq!(result.weighted_score, 4);
        assert_eq!(result.total, 1);
    }

    #[test]
    fn negative_sentiment_dampens_score() {
        let eng = engine();
        let now = fixed_now();
        let result = eng.categorize(
            &[bucket(
                "La Tercera",
                vec![article("Jara cae en la encuesta", "", now)],
            )],
            "Jeannette Jara",
            now,
        );
        // 1 × 2 × 1.5 × 0.9 × 1.2 = 3.24 → 3
        assert_eq!(result.press[0].score, 3);
        assert_eq!(result.metrics.sentiment.negative, 1);
    }

    #[test]
    fn sentiment_tie_is_neutral() {
        let eng = engine();
        let now = fixed_now();
        // One positive ("sube") and one negative ("cae") keyword.
        let result = eng.categorize(
            &[bucket(
                "Emol",
                vec![article("Kast sube en una región y cae en otra", "", now)],
            )],
            "José Antonio Kast",
            now,
        );
        assert_eq!(result.metrics.sentiment.neutral, 1);
        assert_eq!(result.metrics.sentiment.positive, 0);
        assert_eq!(result.metrics.sentiment.negative, 0);
    }

    #[test]
    fn description_mention_applies_its_own_multiplier() {
        let eng = engine();
        let now = fixed_now();
        let a = article("Encuesta presidencial", "Parisi mantiene su apoyo", now);
        let mut metrics = Metrics::default();
        let raw = eng.score_article(&a, "franco parisi", "parisi", 1.0, now, &mut metrics);
        // 1 × 1.3 (description) × 1.5 (recent)
        assert!((raw - 1.95).abs() < 1e-9);
        assert_eq!(metrics.title_mentions, 0);
        assert_eq!(metrics.description_mentions, 1);
    }

    #[test]
    fn recency_tiers_and_old_counter() {
        let eng = engine();
        let now = fixed_now();
        let mut metrics = Metrics::default();

        let ten_days = article("Sin mención", "", now - Duration::days(10));
        let raw = eng.score_article(&ten_days, "x y", "y", 1.0, now, &mut metrics);
        assert!((raw - 1.2).abs() < 1e-9, "10-day article gets the 1.2 tier");
        assert_eq!(metrics.old_articles, 1);
        assert_eq!(metrics.recent_articles, 0);

        let twenty_days = article("Sin mención", "", now - Duration::days(20));
        let raw = eng.score_article(&twenty_days, "x y", "y", 1.0, now, &mut metrics);
        assert!((raw - 1.0).abs() < 1e-9);
        assert_eq!(metrics.old_articles, 2);
    }

    #[test]
    fn unparseable_publish_date_counts_as_old() {
        let eng = engine();
        let now = fixed_now();
        let mut a = article("Sin mención", "", now);
        a.published_at = Some("no es una fecha".to_string());
        let mut metrics = Metrics::default();
        let raw = eng.score_article(&a, "x y", "y", 1.0, now, &mut metrics);
        assert!((raw - 1.0).abs() < 1e-9);
        assert_eq!(metrics.old_articles, 1);
    }

    #[test]
    fn last_name_alone_matches_title() {
        let eng = engine();
        let now = fixed_now();
        let result = eng.categorize(
            &[bucket(
                "T13",
                vec![article("Kast presenta su programa", "", now)],
            )],
            "José Antonio Kast",
            now,
        );
        assert_eq!(result.metrics.title_mentions, 1);
        assert_eq!(result.tv.len(), 1);
    }

    #[test]
    fn hyphenated_last_name_is_one_token() {
        let eng = engine();
        let now = fixed_now();
        let result = eng.categorize(
            &[bucket(
                "Emol",
                vec![article("Enríquez-Ominami inscribe su candidatura", "", now)],
            )],
            "Marco Enríquez-Ominami",
            now,
        );
        assert_eq!(result.metrics.title_mentions, 1);
    }

    #[test]
    fn most_recent_is_first_of_bucket_and_samples_cap_at_five() {
        let eng = engine();
        let now = fixed_now();
        let articles: Vec<Article> = (0..7)
            .map(|i| {
                article(
                    &format!("Nota {i}"),
                    "",
                    now - Duration::days(i),
                )
            })
            .collect();
        let result = eng.categorize(&[bucket("Cooperativa", articles)], "Jeannette Jara", now);

        let summary = &result.press[0];
        assert_eq!(summary.count, 7);
        assert_eq!(summary.all_articles.len(), 5);
        assert_eq!(
            summary.recent_article.as_ref().and_then(|s| s.title.clone()),
            Some("Nota 0".to_string())
        );
    }

    #[test]
    fn empty_input_yields_zeroed_result() {
        let eng = engine();
        let result = eng.categorize(&[], "Eduardo Artés", fixed_now());
        assert_eq!(result.total, 0);
        assert_eq!(result.weighted_score, 0);
        assert_eq!(result.metrics.frequency, "0.00");
        assert!(result.press.is_empty() && result.other.is_empty());
    }

    #[test]
    fn categorize_is_idempotent() {
        let eng = engine();
        let now = fixed_now();
        let buckets = vec![
            bucket(
                "La Tercera",
                vec![
                    article("Jara lidera la encuesta", "Jara sube", now),
                    article("Debate presidencial", "", now - Duration::days(9)),
                ],
            ),
            bucket("Radio Futuro", vec![article("Sin mención", "", now)]),
        ];
        let first = eng.categorize(&buckets, "Jeannette Jara", now);
        let second = eng.categorize(&buckets, "Jeannette Jara", now);
        assert_eq!(first, second);
    }

    #[test]
    fn weighted_score_is_never_negative() {
        let eng = engine();
        let now = fixed_now();
        // All-negative sentiment, old articles, unknown source: worst case.
        let buckets = vec![bucket(
            "Pasquín Local",
            vec![
                article("Crisis y polémica", "rechaza la crítica", now - Duration::days(25)),
                article("cae y pierde", "baja", now - Duration::days(40)),
            ],
        )];
        let result = eng.categorize(&buckets, "Harold Mayne-Nicholls", now);
        assert!(result.weighted_score >= 0);
        assert_eq!(result.other.len(), 1);
    }
}
