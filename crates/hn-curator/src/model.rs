use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum post fetched from the item source, before any filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    /// Source-assigned identifier, unique within one run.
    pub id: u64,
    /// Post title. May be empty.
    pub title: String,
    /// Destination URL, or the discussion page when the post has no link.
    pub url: String,
    /// Source-reported popularity. `None` counts as zero.
    pub popularity_score: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl CandidateItem {
    pub fn popularity(&self) -> i64 {
        self.popularity_score.unwrap_or(0)
    }
}

/// Relevance assessment returned by the judge for one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Judgment {
    /// Declared range is 1-10; out-of-range values are kept as-is.
    pub relevance_score: i64,
    pub summary: String,
    pub reasoning: String,
}

/// A candidate that passed both the popularity pre-filter and the relevance threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CuratedItem {
    #[serde(flatten)]
    pub item: CandidateItem,
    pub relevance_score: i64,
    pub summary: String,
    pub reasoning: String,
    /// Position in the fetched list; final tie-break when ranking.
    #[serde(skip)]
    pub fetch_index: usize,
}

impl CuratedItem {
    pub fn new(item: CandidateItem, judgment: Judgment, fetch_index: usize) -> Self {
        Self {
            item,
            relevance_score: judgment.relevance_score,
            summary: judgment.summary,
            reasoning: judgment.reasoning,
            fetch_index,
        }
    }
}
