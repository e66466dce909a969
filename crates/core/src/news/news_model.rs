//! News domain models and the merge, filter and pagination pipeline.

use chrono::{DateTime, Duration, Utc};
use finmate_market_data::NewsArticle;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 150;
pub const MAX_LIMIT: usize = 1000;
/// Articles older than this are dropped from every feed.
pub const MAX_AGE_DAYS: i64 = 365;

lazy_static! {
    /// Quarter markers such as "Q2" as a whole word
    static ref QUARTER: Regex = Regex::new(r"\bq[1-4]\b").expect("Invalid regex pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewsCategory {
    DividendUp,
    DividendDown,
    SpinOff,
    Earnings,
}

/// Keyword tags derived from an article title.
pub fn categorize(title: &str) -> Vec<NewsCategory> {
    let title = title.to_lowercase();
    let mut categories = Vec::new();

    if title.contains("dividend") {
        if title.contains("increase") || title.contains("raise") {
            categories.push(NewsCategory::DividendUp);
        }
        if title.contains("cut") || title.contains("reduce") || title.contains("slash") {
            categories.push(NewsCategory::DividendDown);
        }
    }
    if title.contains("spin") && title.contains("off") {
        categories.push(NewsCategory::SpinOff);
    }
    if QUARTER.is_match(&title) || title.contains("earnings") {
        categories.push(NewsCategory::Earnings);
    }
    categories
}

/// Polygon article tagged with the ticker it was fetched for.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewsItem {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub ticker: String,
    pub categories: Vec<NewsCategory>,
    #[serde(skip)]
    pub published: DateTime<Utc>,
}

/// Page window requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsPaging {
    pub limit: usize,
    pub offset: usize,
}

impl NewsPaging {
    /// Lenient parse of raw query values: a missing, unparseable or
    /// non-positive limit falls back to the default; offset floors at 0.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| (l as usize).min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        let offset = offset
            .and_then(|o| o.trim().parse::<i64>().ok())
            .map(|o| o.max(0) as usize)
            .unwrap_or(0);
        Self { limit, offset }
    }

    /// Articles requested per ticker for an ad-hoc feed.
    pub fn per_ticker_cap(&self) -> u32 {
        self.limit.clamp(150, 200) as u32
    }
}

impl Default for NewsPaging {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    pub items: Vec<NewsItem>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickers: Option<Vec<String>>,
}

/// Filter to the last year, tag, sort newest first and cut one page.
///
/// Articles without a parseable `published_utc` are dropped.
pub fn build_page(
    fetched: Vec<(String, NewsArticle)>,
    now: DateTime<Utc>,
    paging: NewsPaging,
) -> NewsPage {
    let cutoff = now - Duration::days(MAX_AGE_DAYS);

    let mut items: Vec<NewsItem> = fetched
        .into_iter()
        .filter_map(|(ticker, article)| {
            let published = article
                .published_utc
                .as_deref()
                .and_then(|p| DateTime::parse_from_rfc3339(p).ok())?
                .with_timezone(&Utc);
            if published < cutoff {
                return None;
            }
            let categories = categorize(article.title.as_deref().unwrap_or_default());
            Some(NewsItem {
                article,
                ticker,
                categories,
                published,
            })
        })
        .collect();

    items.sort_by(|a, b| b.published.cmp(&a.published));

    let total = items.len();
    let page = items
        .into_iter()
        .skip(paging.offset)
        .take(paging.limit)
        .collect();

    NewsPage {
        items: page,
        total,
        limit: paging.limit,
        offset: paging.offset,
        tickers: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn article(title: &str, published: &str) -> NewsArticle {
        NewsArticle {
            title: Some(title.to_string()),
            published_utc: Some(published.to_string()),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_categorize() {
        assert_eq!(
            categorize("Coca-Cola raises quarterly dividend"),
            vec![NewsCategory::DividendUp]
        );
        assert_eq!(
            categorize("Intel slashes dividend after weak Q2"),
            vec![NewsCategory::DividendDown, NewsCategory::Earnings]
        );
        assert_eq!(
            categorize("GE completes spin-off of Vernova"),
            vec![NewsCategory::SpinOff]
        );
        assert_eq!(categorize("Apple earnings preview"), vec![NewsCategory::Earnings]);
        assert!(categorize("Fed holds rates steady").is_empty());
        assert!(categorize("Q22 roadmap").is_empty());
    }

    #[test]
    fn test_paging_from_query() {
        assert_eq!(NewsPaging::from_query(None, None), NewsPaging::default());
        assert_eq!(
            NewsPaging::from_query(Some("5000"), Some("-3")),
            NewsPaging {
                limit: 1000,
                offset: 0
            }
        );
        assert_eq!(NewsPaging::from_query(Some("abc"), Some("20")).limit, 150);
        assert_eq!(NewsPaging::from_query(Some("0"), None).limit, 150);
    }

    #[test]
    fn test_per_ticker_cap() {
        let cap = |limit| NewsPaging { limit, offset: 0 }.per_ticker_cap();
        assert_eq!(cap(10), 150);
        assert_eq!(cap(180), 180);
        assert_eq!(cap(1000), 200);
    }

    #[test]
    fn test_build_page_filters_sorts_and_slices() {
        let fetched = vec![
            ("AAPL".to_string(), article("Old news", "2023-01-01T00:00:00Z")),
            ("AAPL".to_string(), article("Apple Q2 earnings", "2024-05-02T20:30:00Z")),
            ("MSFT".to_string(), article("Microsoft update", "2024-05-30T10:00:00Z")),
            ("MSFT".to_string(), article("No date", "not-a-date")),
            ("KO".to_string(), article("Coke raises dividend", "2024-04-25T12:00:00Z")),
        ];

        let page = build_page(fetched, now(), NewsPaging { limit: 2, offset: 1 });

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].ticker, "AAPL");
        assert_eq!(page.items[0].categories, vec![NewsCategory::Earnings]);
        assert_eq!(page.items[1].ticker, "KO");
    }

    #[test]
    fn test_item_serialises_flat() {
        let page = build_page(
            vec![("KO".to_string(), article("Coke raises dividend", "2024-05-01T00:00:00Z"))],
            now(),
            NewsPaging::default(),
        );
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"][0]["title"], "Coke raises dividend");
        assert_eq!(json["items"][0]["ticker"], "KO");
        assert_eq!(json["items"][0]["categories"][0], "DIVIDEND_UP");
        assert!(json.get("tickers").is_none());
    }

    proptest! {
        #[test]
        fn prop_page_is_sorted_and_bounded(
            ages in proptest::collection::vec(0i64..400, 0..60),
            limit in 1usize..30,
            offset in 0usize..70,
        ) {
            let fetched: Vec<_> = ages
                .iter()
                .map(|days| {
                    let ts = (now() - Duration::days(*days)).to_rfc3339();
                    ("T".to_string(), article("x", &ts))
                })
                .collect();
            let fresh = ages.iter().filter(|d| **d <= MAX_AGE_DAYS).count();

            let page = build_page(fetched, now(), NewsPaging { limit, offset });

            prop_assert_eq!(page.total, fresh);
            prop_assert!(page.items.len() <= limit);
            prop_assert_eq!(page.items.len(), fresh.saturating_sub(offset).min(limit));
            prop_assert!(page.items.windows(2).all(|w| w[0].published >= w[1].published));
        }
    }
}
