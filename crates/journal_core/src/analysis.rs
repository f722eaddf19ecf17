//! crates/journal_core/src/analysis.rs
//!
//! On-demand pattern analysis across all of a user's entries.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::archive::EntryQuery;
use crate::domain::Entry;
use crate::ports::{EntryStore, PatternAnalysisService, PortResult};

/// Returned in place of an analysis when there is nothing to analyse.
pub const NEED_MORE_ENTRIES: &str = "You need some writing entries before patterns can be analyzed. Start writing and come back when you have a few entries!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Themes,
    Characters,
    Style,
    Stories,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Themes,
        AnalysisKind::Characters,
        AnalysisKind::Style,
        AnalysisKind::Stories,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AnalysisKind::Themes => "Thematic Connections",
            AnalysisKind::Characters => "Characters & Settings",
            AnalysisKind::Style => "Stylistic Patterns",
            AnalysisKind::Stories => "Story Threads",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub title: String,
    pub analysis: String,
}

/// Concatenates entries into the single block the analyst reads.
pub fn format_entries(entries: &[Entry], offset: FixedOffset) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let date = entry.created_at.with_timezone(&offset).format("%b %-d, %Y");
            format!(
                "--- Entry {} ({}, {}) ---\n{}",
                index + 1,
                entry.entry_type,
                date,
                entry.entry_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fetches every entry the user has written and asks the analyst about them.
pub async fn run_pattern_analysis<S: EntryStore + ?Sized>(
    entries: &S,
    analyst: &dyn PatternAnalysisService,
    user_id: Uuid,
    kind: AnalysisKind,
    offset: FixedOffset,
) -> PortResult<AnalysisReport> {
    let all = entries.list_entries(user_id, &EntryQuery::all()).await?;

    if all.is_empty() {
        return Ok(AnalysisReport {
            title: kind.title().to_string(),
            analysis: NEED_MORE_ENTRIES.to_string(),
        });
    }

    info!("Running {:?} analysis over {} entries", kind, all.len());
    let analysis = analyst.analyze(kind, &format_entries(&all, offset)).await?;

    Ok(AnalysisReport {
        title: kind.title().to_string(),
        analysis: analysis.trim().to_string(),
    })
}
