/// Curation pipeline: fetch, popularity pre-filter, judge, relevance threshold, rank.
///
/// Each candidate moves `Fetched -> PrefilterPassed -> Judged -> Curated`, or stops in
/// `RejectedByPrefilter` / `RejectedByRelevance`. Per-item failures never abort the run.
use std::cmp::Ordering;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::judge::RelevanceJudge;
use crate::model::{CandidateItem, CuratedItem};
use crate::source::ItemSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Fetched,
    PrefilterPassed,
    Judged,
    Curated,
    RejectedByPrefilter,
    /// Judged below the threshold, or the judge produced nothing usable.
    RejectedByRelevance,
}

/// Result of one curation pass.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Curated items, best first.
    pub digest: Vec<CuratedItem>,
    pub fetched: usize,
    pub rejected_by_prefilter: usize,
    pub judge_failed: usize,
    pub below_threshold: usize,
    /// The source could not be reached; the run continued with no candidates.
    pub source_unavailable: bool,
}

impl RunReport {
    pub fn judged(&self) -> usize {
        self.digest.len() + self.below_threshold
    }
}

enum JudgeOutcome {
    Curated(CuratedItem),
    JudgeFailed,
    BelowThreshold,
}

/// Cheap gate applied before the judge. A missing score counts as zero.
pub fn passes_prefilter(item: &CandidateItem, min_popularity: i64) -> bool {
    item.popularity() >= min_popularity
}

/// Order curated items by relevance, then popularity, both descending.
///
/// Equal keys keep fetch order via `fetch_index`, so the result does not depend on the
/// order in which judgments completed.
pub fn rank(mut items: Vec<CuratedItem>) -> Vec<CuratedItem> {
    items.sort_by(compare_curated);
    items
}

fn compare_curated(a: &CuratedItem, b: &CuratedItem) -> Ordering {
    b.relevance_score
        .cmp(&a.relevance_score)
        .then_with(|| b.item.popularity().cmp(&a.item.popularity()))
        .then_with(|| a.fetch_index.cmp(&b.fetch_index))
}

pub struct Curator<'a> {
    config: &'a Config,
    judge: &'a dyn RelevanceJudge,
}

impl<'a> Curator<'a> {
    pub fn new(config: &'a Config, judge: &'a dyn RelevanceJudge) -> Self {
        Self { config, judge }
    }

    /// Fetch candidates from `source` and curate them.
    ///
    /// An unavailable source yields an empty report rather than an error.
    pub async fn run(&self, source: &dyn ItemSource) -> RunReport {
        match source.fetch(self.config.max_items_fetched).await {
            Ok(candidates) => self.curate(candidates).await,
            Err(e) => {
                warn!(error = %e, "item source unavailable, continuing with no candidates");
                RunReport {
                    source_unavailable: true,
                    ..RunReport::default()
                }
            }
        }
    }

    pub async fn curate(&self, candidates: Vec<CandidateItem>) -> RunReport {
        let mut report = RunReport {
            fetched: candidates.len(),
            ..RunReport::default()
        };
        info!(count = candidates.len(), "evaluating candidates");

        let mut to_judge = Vec::with_capacity(candidates.len());
        for (fetch_index, item) in candidates.into_iter().enumerate() {
            debug!(id = item.id, state = ?ItemState::Fetched, "candidate");
            if passes_prefilter(&item, self.config.min_popularity) {
                debug!(id = item.id, state = ?ItemState::PrefilterPassed, "candidate");
                to_judge.push((fetch_index, item));
            } else {
                debug!(
                    id = item.id,
                    title = %item.title,
                    score = ?item.popularity_score,
                    state = ?ItemState::RejectedByPrefilter,
                    "skipping low popularity item"
                );
                report.rejected_by_prefilter += 1;
            }
        }

        // buffer_unordered(1) preserves list order, so the default stays strictly sequential.
        let outcomes: Vec<JudgeOutcome> = stream::iter(to_judge)
            .map(|(fetch_index, item)| self.judge_one(fetch_index, item))
            .buffer_unordered(self.config.judge_concurrency.max(1))
            .collect()
            .await;

        let mut curated = Vec::new();
        for outcome in outcomes {
            match outcome {
                JudgeOutcome::Curated(item) => curated.push(item),
                JudgeOutcome::JudgeFailed => report.judge_failed += 1,
                JudgeOutcome::BelowThreshold => report.below_threshold += 1,
            }
        }
        report.digest = rank(curated);

        info!(
            fetched = report.fetched,
            prefiltered = report.rejected_by_prefilter,
            judged = report.judged(),
            judge_failed = report.judge_failed,
            below_threshold = report.below_threshold,
            curated = report.digest.len(),
            "curation finished"
        );
        report
    }

    async fn judge_one(&self, fetch_index: usize, item: CandidateItem) -> JudgeOutcome {
        let Some(judgment) = self
            .judge
            .evaluate(&item.title, &item.url, &self.config.interest_profile)
            .await
        else {
            info!(
                id = item.id,
                title = %item.title,
                state = ?ItemState::RejectedByRelevance,
                "skipping item, judge produced no evaluation"
            );
            return JudgeOutcome::JudgeFailed;
        };
        debug!(id = item.id, state = ?ItemState::Judged, score = judgment.relevance_score, "judged");

        if judgment.relevance_score >= self.config.min_relevance {
            debug!(
                id = item.id,
                title = %item.title,
                score = judgment.relevance_score,
                state = ?ItemState::Curated,
                "relevant"
            );
            JudgeOutcome::Curated(CuratedItem::new(item, judgment, fetch_index))
        } else {
            debug!(
                id = item.id,
                title = %item.title,
                score = judgment.relevance_score,
                state = ?ItemState::RejectedByRelevance,
                "not relevant"
            );
            JudgeOutcome::BelowThreshold
        }
    }
}
