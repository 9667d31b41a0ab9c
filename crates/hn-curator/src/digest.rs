use std::io::Write;

use crate::model::CuratedItem;
use crate::pipeline::RunReport;

pub const NOTHING_RELEVANT: &str = "No articles of interest found today.";
pub const SOURCE_UNAVAILABLE: &str =
    "Could not fetch stories from Hacker News, no digest this run.";

/// Presents a ranked digest. The pipeline does not care where it goes.
pub trait DigestRenderer {
    fn render(&self, digest: &[CuratedItem], out: &mut dyn Write) -> std::io::Result<()>;

    /// Output for a run whose item source could not be reached.
    fn render_unavailable(&self, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Render a finished run, keeping "nothing relevant" apart from "nothing fetched".
pub fn render_report(
    renderer: &dyn DigestRenderer,
    report: &RunReport,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    if report.source_unavailable {
        renderer.render_unavailable(out)
    } else {
        renderer.render(&report.digest, out)
    }
}

/// Numbered plain-text listing for the terminal.
pub struct TextDigest;

impl DigestRenderer for TextDigest {
    fn render(&self, digest: &[CuratedItem], out: &mut dyn Write) -> std::io::Result<()> {
        if digest.is_empty() {
            return writeln!(out, "{NOTHING_RELEVANT}");
        }

        writeln!(out, "--- Your LLM-Curated Hacker News Digest ---")?;
        for (i, curated) in digest.iter().enumerate() {
            let title = if curated.item.title.is_empty() {
                "No Title"
            } else {
                curated.item.title.as_str()
            };
            let hn_score = curated
                .item
                .popularity_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "N/A".to_string());

            writeln!(out)?;
            writeln!(out, "{}. {title}", i + 1)?;
            writeln!(out, "   URL: {}", curated.item.url)?;
            writeln!(out, "   Scores: HN={hn_score}, LLM={}/10", curated.relevance_score)?;
            writeln!(out, "   Summary: {}", curated.summary)?;
            writeln!(out, "   Reasoning: {}", curated.reasoning)?;
            writeln!(out, "---")?;
        }
        writeln!(out)
    }

    fn render_unavailable(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "{SOURCE_UNAVAILABLE}")
    }
}

/// Pretty-printed JSON array, one object per curated item.
pub struct JsonDigest;

impl DigestRenderer for JsonDigest {
    fn render(&self, digest: &[CuratedItem], out: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, digest)?;
        writeln!(out)
    }

    fn render_unavailable(&self, out: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(
            &mut *out,
            &serde_json::json!({ "error": "source_unavailable", "items": [] }),
        )?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateItem, Judgment};

    fn curated(title: &str, popularity: Option<i64>, relevance: i64) -> CuratedItem {
        CuratedItem::new(
            CandidateItem {
                id: 7,
                title: title.to_string(),
                url: "https://example.com/post".to_string(),
                popularity_score: popularity,
                timestamp: None,
            },
            Judgment {
                relevance_score: relevance,
                summary: "A post about Rust.".to_string(),
                reasoning: "Matches the profile.".to_string(),
            },
            0,
        )
    }

    fn render_text(items: &[CuratedItem]) -> String {
        let mut buf = Vec::new();
        TextDigest.render(items, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_digest_says_nothing_relevant() {
        assert_eq!(render_text(&[]), format!("{NOTHING_RELEVANT}\n"));
    }

    #[test]
    fn text_lists_items_in_given_order() {
        let out = render_text(&[curated("Second best", Some(3), 10), curated("", None, 8)]);
        let first = out.find("1. Second best").unwrap();
        let second = out.find("2. No Title").unwrap();
        assert!(first < second);
        assert!(out.contains("   Scores: HN=3, LLM=10/10"));
        assert!(out.contains("   Scores: HN=N/A, LLM=8/10"));
        assert!(out.contains("   Summary: A post about Rust."));
        assert!(out.contains("   Reasoning: Matches the profile."));
    }

    #[test]
    fn unreachable_source_renders_differently_from_empty_digest() {
        let unavailable = RunReport {
            source_unavailable: true,
            ..RunReport::default()
        };
        let nothing = RunReport::default();

        let mut buf = Vec::new();
        render_report(&TextDigest, &unavailable, &mut buf).unwrap();
        let unavailable_text = String::from_utf8(buf).unwrap();
        assert_eq!(unavailable_text, format!("{SOURCE_UNAVAILABLE}\n"));

        let mut buf = Vec::new();
        render_report(&TextDigest, &nothing, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{NOTHING_RELEVANT}\n"));

        let mut buf = Vec::new();
        render_report(&JsonDigest, &unavailable, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["error"], "source_unavailable");

        let mut buf = Vec::new();
        render_report(&JsonDigest, &nothing, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[test]
    fn json_flattens_item_fields() {
        let mut buf = Vec::new();
        JsonDigest.render(&[curated("Rusty", Some(42), 9)], &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let first = &value[0];
        assert_eq!(first["title"], "Rusty");
        assert_eq!(first["popularity_score"], 42);
        assert_eq!(first["relevance_score"], 9);
        assert!(first.get("fetch_index").is_none());
    }
}
