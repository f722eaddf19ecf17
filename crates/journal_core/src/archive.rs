//! crates/journal_core/src/archive.rs
//!
//! Archive filtering and export. Everything here is pure and synchronous:
//! the caller fetches a user's entries once and slices them in memory.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Entry, WritingKind};

//=========================================================================================
// Filters
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Daily,
    Fiction,
}

impl TypeFilter {
    pub fn kind(&self) -> Option<WritingKind> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Daily => Some(WritingKind::Daily),
            TypeFilter::Fiction => Some(WritingKind::Fiction),
        }
    }
}

/// The archive filter as the user expresses it: a type and an inclusive
/// calendar-date range, both optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveFilter {
    #[serde(rename = "type", default)]
    pub kind: TypeFilter,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub to: Option<NaiveDate>,
}

/// Date inputs submit an empty string when cleared.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<NaiveDate>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// A filter resolved to absolute instants: `created_from <= created_at < created_before`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub kind: Option<WritingKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl EntryQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(kind) = self.kind {
            if entry.entry_type != kind {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if entry.created_at < from {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if entry.created_at >= before {
                return false;
            }
        }
        true
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

impl ArchiveFilter {
    pub fn is_active(&self) -> bool {
        self.kind != TypeFilter::All || self.from.is_some() || self.to.is_some()
    }

    /// Resolves day bounds at `offset`. The upper bound is the midnight after
    /// `to`, so `to` itself is included for any time of day.
    pub fn to_query(&self, offset: FixedOffset) -> EntryQuery {
        EntryQuery {
            kind: self.kind.kind(),
            created_from: self.from.and_then(|d| local_midnight(d, offset)),
            created_before: self
                .to
                .and_then(|d| d.checked_add_signed(Duration::days(1)))
                .and_then(|d| local_midnight(d, offset)),
        }
    }
}

/// Keeps the entries matching `filter`, preserving order.
pub fn filter_entries(entries: &[Entry], filter: &ArchiveFilter, offset: FixedOffset) -> Vec<Entry> {
    let query = filter.to_query(offset);
    entries.iter().filter(|e| query.matches(e)).cloned().collect()
}

//=========================================================================================
// Export
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("There are no entries to export")]
    Empty,
    #[error("Failed to serialize entries: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A rendered export ready to be sent as a file download.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportRecord {
    #[serde(rename = "type")]
    pub kind: WritingKind,
    pub date: DateTime<Utc>,
    pub content: String,
}

/// Renders `entries` in `format`. `today` names the file.
pub fn export_entries(
    entries: &[Entry],
    format: ExportFormat,
    offset: FixedOffset,
    today: NaiveDate,
) -> Result<ExportDocument, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::Empty);
    }

    let body = match format {
        ExportFormat::Markdown => render_markdown(entries, offset),
        ExportFormat::Json => render_json(entries)?,
    };

    Ok(ExportDocument {
        filename: format!("writing-entries-{}.{}", today.format("%Y-%m-%d"), format.extension()),
        content_type: format.content_type(),
        body,
    })
}

fn render_markdown(entries: &[Entry], offset: FixedOffset) -> String {
    entries
        .iter()
        .map(|entry| {
            let date = entry.created_at.with_timezone(&offset).format("%A, %B %-d, %Y");
            format!(
                "# {} - {}\n\n{}\n\n---\n",
                entry.entry_type.label(),
                date,
                entry.entry_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_json(entries: &[Entry]) -> Result<String, serde_json::Error> {
    let records: Vec<ExportRecord> = entries
        .iter()
        .map(|entry| ExportRecord {
            kind: entry.entry_type,
            date: entry.created_at,
            content: entry.entry_text.clone(),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}
