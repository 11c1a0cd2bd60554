//! HTTP surface: router, handlers, and the response envelope.
//!
//! Every endpoint is a thin composition of the search client, the scoring
//! engine, and the cache; no scoring logic lives here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::model::{CategorizedResult, Metrics};
use crate::newsapi::NewsApiClient;
use crate::scoring::ScoringEngine;
use crate::sources::SourceCatalog;
use crate::trending::{self, TimelinePoint};

const DEFAULT_TRENDING_DAYS: u32 = 30;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<NewsApiClient>,
    pub scoring: Arc<ScoringEngine>,
    pub cache: Arc<ResponseCache>,
    pub candidates: Arc<Vec<String>>,
    pub ranking_delay: Duration,
    pub started_at: Instant,
}

impl AppState {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            search: Arc::new(NewsApiClient::new(cfg)),
            scoring: Arc::new(ScoringEngine::new(SourceCatalog::load_default())),
            cache: Arc::new(ResponseCache::default()),
            candidates: Arc::new(cfg.candidates.clone()),
            ranking_delay: cfg.ranking_delay,
            started_at: Instant::now(),
        }
    }
}

pub fn router(cfg: &AppConfig, state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/ranking", get(ranking))
        .route("/api/candidate/{name}", get(candidate))
        .route("/api/trending/{name}", get(trending_timeline))
        .route("/api/compare", get(compare))
        .route("/api/cache/clear", post(cache_clear))
        .layer(cors_layer(&cfg.allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/* ----------------------------
Response envelope
---------------------------- */

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Envelope {
    fn data(data: Value, cached: bool) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            cached: Some(cached),
            timestamp: Some(now_iso()),
            duration: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            cached: None,
            timestamp: None,
            duration: None,
        }
    }
}

type ApiResult = (StatusCode, Json<Envelope>);

fn ok_fresh(data: Value) -> ApiResult {
    (StatusCode::OK, Json(Envelope::data(data, false)))
}

fn ok_cached(data: Value) -> ApiResult {
    (StatusCode::OK, Json(Envelope::data(data, true)))
}

fn client_error(message: impl Into<String>) -> ApiResult {
    (StatusCode::BAD_REQUEST, Json(Envelope::error(message)))
}

fn internal_error(message: impl Into<String>) -> ApiResult {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::error(message)),
    )
}

fn encode(value: impl Serialize) -> Result<Value, ApiResult> {
    serde_json::to_value(value).map_err(|e| internal_error(format!("encoding failed: {e}")))
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/* ----------------------------
Endpoint payload shapes
---------------------------- */

#[derive(Debug, Deserialize)]
struct RangeQuery {
    from: Option<String>,
    to: Option<String>,
}

impl RangeQuery {
    fn cache_fragment(&self) -> String {
        format!(
            "{}_{}",
            self.from.as_deref().unwrap_or("none"),
            self.to.as_deref().unwrap_or("none")
        )
    }
}

#[derive(Debug, Serialize)]
struct MediaNames {
    press: Vec<String>,
    tv: Vec<String>,
    radio: Vec<String>,
    other: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RankingEntry {
    name: String,
    mentions: usize,
    weighted_score: i64,
    metrics: Metrics,
    total_results: u64,
    articles_count: usize,
    media: MediaNames,
    details: CategorizedResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CandidateReport {
    #[serde(flatten)]
    details: CategorizedResult,
    total_results: u64,
    articles_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareEntry {
    name: String,
    mentions: usize,
    weighted_score: i64,
    metrics: Metrics,
}

#[derive(Debug, Serialize)]
struct TrendingReport {
    candidate: String,
    period: String,
    timeline: Vec<TimelinePoint>,
}

/* ----------------------------
Handlers
---------------------------- */

async fn ranking(State(state): State<AppState>, Query(range): Query<RangeQuery>) -> ApiResult {
    let key = format!("full_ranking_{}", range.cache_fragment());
    if let Some(hit) = state.cache.get(&key) {
        info!(%key, "ranking served from cache");
        return ok_cached(hit);
    }

    info!(candidates = state.candidates.len(), "building full ranking");
    let started = Instant::now();

    let mut entries: Vec<RankingEntry> = Vec::with_capacity(state.candidates.len());
    for (i, name) in state.candidates.iter().enumerate() {
        // Upstream rate-limit pause between sequential calls.
        if i > 0 && !state.ranking_delay.is_zero() {
            tokio::time::sleep(state.ranking_delay).await;
        }
        info!(candidate = %name, step = i + 1, of = state.candidates.len(), "processing");

        let news = state
            .search
            .search(name, range.from.as_deref(), range.to.as_deref())
            .await;
        let details = state
            .scoring
            .categorize(&news.articles_by_source, name, Utc::now());

        entries.push(RankingEntry {
            name: name.clone(),
            mentions: details.total,
            weighted_score: details.weighted_score,
            metrics: details.metrics.clone(),
            total_results: news.total_results,
            articles_count: news.articles_count,
            media: MediaNames {
                press: CategorizedResult::source_names(&details.press),
                tv: CategorizedResult::source_names(&details.tv),
                radio: CategorizedResult::source_names(&details.radio),
                other: CategorizedResult::source_names(&details.other),
            },
            details,
        });
    }

    // Stable sort: equal scores keep roster order.
    entries.sort_by(|a, b| b.weighted_score.cmp(&a.weighted_score));

    let data = match encode(&entries) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    state.cache.set(&key, data.clone());

    let duration = format!("{:.1}s", started.elapsed().as_secs_f64());
    info!(%duration, "ranking complete");

    let (status, Json(mut envelope)) = ok_fresh(data);
    envelope.duration = Some(duration);
    (status, Json(envelope))
}

async fn candidate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(range): Query<RangeQuery>,
) -> ApiResult {
    let key = format!("{}_{}", name, range.cache_fragment());
    if let Some(hit) = state.cache.get(&key) {
        info!(candidate = %name, "served from cache");
        return ok_cached(hit);
    }

    let news = state
        .search
        .search(&name, range.from.as_deref(), range.to.as_deref())
        .await;
    let details = state
        .scoring
        .categorize(&news.articles_by_source, &name, Utc::now());

    let report = CandidateReport {
        details,
        total_results: news.total_results,
        articles_count: news.articles_count,
    };
    let data = match encode(&report) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    state.cache.set(&key, data.clone());
    ok_fresh(data)
}

async fn trending_timeline(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    // Lenient parse: non-numeric or < 1 falls back to the default window.
    let days = query
        .get("days")
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|d| *d >= 1)
        .unwrap_or(DEFAULT_TRENDING_DAYS);

    let key = format!("trending_{name}_{days}");
    if let Some(hit) = state.cache.get(&key) {
        return ok_cached(hit);
    }

    let now = Utc::now();
    let from = (now - chrono::Duration::days(i64::from(days))).to_rfc3339();
    let to = now.to_rfc3339();
    let news = state.search.search(&name, Some(&from), Some(&to)).await;

    let mut timeline = trending::build_timeline(days, now);
    trending::distribute(&mut timeline, &news.all_articles);

    let report = TrendingReport {
        candidate: name,
        period: format!("{days} days"),
        timeline,
    };
    let data = match encode(&report) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    state.cache.set(&key, data.clone());
    ok_fresh(data)
}

async fn compare(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let candidates = parse_candidates(query.get("candidates").map(String::as_str).unwrap_or(""));
    if candidates.len() < 2 {
        return client_error("at least 2 candidates are required to compare");
    }

    let mut sorted = candidates.clone();
    sorted.sort();
    let key = format!("compare_{}", sorted.join("_"));
    if let Some(hit) = state.cache.get(&key) {
        return ok_cached(hit);
    }

    let mut comparison: Vec<CompareEntry> = Vec::with_capacity(candidates.len());
    for name in &candidates {
        let news = state.search.search(name, None, None).await;
        let details = state
            .scoring
            .categorize(&news.articles_by_source, name, Utc::now());
        comparison.push(CompareEntry {
            name: name.clone(),
            mentions: details.total,
            weighted_score: details.weighted_score,
            metrics: details.metrics,
        });
    }

    let data = match encode(&comparison) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    state.cache.set(&key, data.clone());
    ok_fresh(data)
}

async fn cache_clear(State(state): State<AppState>) -> Json<Value> {
    let cleared = state.cache.clear();
    info!(cleared, "cache flushed");
    Json(json!({
        "success": true,
        "message": format!("Cache cleared: {cleared} entries"),
        "keysCleared": cleared,
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": now_iso(),
        "api": "NewsAPI",
        "apiConfigured": true,
        "cache": {
            "entries": state.cache.len(),
            "keys": state.cache.keys(),
        },
        "uptime": state.started_at.elapsed().as_secs(),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": "Candidate Mention Ranker",
        "version": env!("CARGO_PKG_VERSION"),
        "dataSource": "NewsAPI.org",
        "endpoints": {
            "ranking": "GET /api/ranking?from=YYYY-MM-DD&to=YYYY-MM-DD",
            "candidate": "GET /api/candidate/{name}?from=YYYY-MM-DD&to=YYYY-MM-DD",
            "trending": "GET /api/trending/{name}?days=30",
            "compare": "GET /api/compare?candidates=name1,name2",
            "cache_clear": "POST /api/cache/clear",
            "health": "GET /health",
        },
        "notes": [
            "from/to are optional; the default window is the last 30 days",
            "dates accept ISO-8601 date or date-time strings",
            "NewsAPI free tier allows 100 requests/day",
        ],
    }))
}

fn parse_candidates(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
