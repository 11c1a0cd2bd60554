//! Day-bucketed mention timeline for the trending endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Article;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: String,
    pub mentions: u32,
    pub score: u32,
}

/// `days` consecutive zeroed entries, dated `YYYY-MM-DD` (UTC), ending today.
pub fn build_timeline(days: u32, now: DateTime<Utc>) -> Vec<TimelinePoint> {
    let today = now.date_naive();
    (0..i64::from(days))
        .rev()
        .map(|offset| TimelinePoint {
            date: (today - Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string(),
            mentions: 0,
            score: 0,
        })
        .collect()
}

/// Distribute articles onto the timeline by publish date. Articles outside
/// the window or with unparseable dates are skipped.
pub fn distribute(timeline: &mut [TimelinePoint], articles: &[Article]) {
    for article in articles {
        let Some(date) = article.published_at.as_deref().and_then(publish_date) else {
            continue;
        };
        if let Some(day) = timeline.iter_mut().find(|d| d.date == date) {
            day.mentions += 1;
            day.score += 1;
        }
    }
}

fn publish_date(ts: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive().format("%Y-%m-%d").to_string())
}
