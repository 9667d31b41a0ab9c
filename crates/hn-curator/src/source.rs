/// Hacker News item source.
///
/// Reads the top-story id list, then each item's details. Individual detail failures
/// are logged and skipped; only a failure to get the id list makes the source unavailable.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::model::CandidateItem;

/// Detail requests in flight at once. Results keep the ranking order of the id list.
const DETAIL_FETCH_CONCURRENCY: usize = 8;

/// Anything that can hand the curator a bounded, ordered list of candidate posts.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch(&self, limit: usize) -> Result<Vec<CandidateItem>, AppError>;
}

pub struct HackerNewsSource {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct HnItem {
    id: u64,
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    url: Option<String>,
    score: Option<i64>,
    time: Option<i64>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

impl HackerNewsSource {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent("hn-curator")
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(curator_common::error::CommonError::from)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn top_story_ids(&self, limit: usize) -> Result<Vec<u64>, AppError> {
        let url = format!("{}/topstories.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::SourceUnavailable(format!("GET {url}: {e}")))?;
        let mut ids: Vec<u64> = resp
            .json()
            .await
            .map_err(|e| AppError::SourceUnavailable(format!("decode {url}: {e}")))?;
        ids.truncate(limit);
        Ok(ids)
    }

    async fn item_details(&self, id: u64) -> Option<HnItem> {
        let url = format!("{}/item/{id}.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch item details"))
            .ok()?;
        // The API answers `null` for unknown ids.
        resp.json::<Option<HnItem>>()
            .await
            .inspect_err(|e| warn!(id, error = %e, "failed to decode item details"))
            .ok()
            .flatten()
    }
}

#[async_trait]
impl ItemSource for HackerNewsSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<CandidateItem>, AppError> {
        let ids = self.top_story_ids(limit).await?;
        info!(count = ids.len(), "fetching item details");

        let details: Vec<Option<HnItem>> = stream::iter(ids)
            .map(|id| self.item_details(id))
            .buffered(DETAIL_FETCH_CONCURRENCY)
            .collect()
            .await;

        let items: Vec<CandidateItem> = details
            .into_iter()
            .flatten()
            .filter_map(into_candidate)
            .collect();
        info!(count = items.len(), "fetched stories");
        Ok(items)
    }
}

fn into_candidate(item: HnItem) -> Option<CandidateItem> {
    if item.kind.as_deref() != Some("story") || item.deleted || item.dead {
        debug!(id = item.id, kind = ?item.kind, "skipping non-story item");
        return None;
    }
    let url = item
        .url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| discussion_url(item.id));
    Some(CandidateItem {
        id: item.id,
        title: item.title.unwrap_or_default(),
        url,
        popularity_score: item.score,
        timestamp: item.time.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)),
    })
}

pub fn discussion_url(id: u64) -> String {
    format!("https://news.ycombinator.com/item?id={id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_item(server: &MockServer, id: u64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/item/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn keeps_stories_in_order_and_skips_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/topstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                1, 2, 3, 4, 5, 6
            ])))
            .mount(&server)
            .await;

        mount_item(
            &server,
            1,
            serde_json::json!({"id": 1, "type": "story", "title": "First", "url": "https://a.example", "score": 120, "time": 1_700_000_000}),
        )
        .await;
        mount_item(
            &server,
            2,
            serde_json::json!({"id": 2, "type": "job", "title": "Hiring", "score": 1}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/item/3.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_item(
            &server,
            4,
            serde_json::json!({"id": 4, "type": "story", "title": "Ask HN: something", "score": 33}),
        )
        .await;
        mount_item(&server, 5, serde_json::Value::Null).await;
        // 6 is past the limit

        let source = HackerNewsSource::new(&server.uri()).unwrap();
        let items = source.fetch(5).await.unwrap();

        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(items[0].url, "https://a.example");
        assert_eq!(items[0].popularity_score, Some(120));
        assert_eq!(
            items[0].timestamp.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert_eq!(items[1].url, discussion_url(4));
        assert!(items[1].timestamp.is_none());
    }

    #[tokio::test]
    async fn missing_id_list_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/topstories.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HackerNewsSource::new(&server.uri()).unwrap();
        let err = source.fetch(10).await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[test]
    fn missing_score_is_kept_as_absent() {
        let item = HnItem {
            id: 9,
            kind: Some("story".to_string()),
            title: None,
            url: Some(String::new()),
            score: None,
            time: None,
            deleted: false,
            dead: false,
        };
        let candidate = into_candidate(item).unwrap();
        assert_eq!(candidate.title, "");
        assert_eq!(candidate.url, discussion_url(9));
        assert_eq!(candidate.popularity(), 0);
    }
}
