//! Importance records produced by the scorer.

use serde::{Deserialize, Serialize};

/// Importance tier of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Density below every threshold
    Low,
    /// Density between the medium and high thresholds (three-tier scheme only)
    Medium,
    /// Density at or above the high threshold
    High,
}

impl Importance {
    /// Lowercase name, as used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Score of one paragraph. Consumed read-only by the highlighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportanceRecord {
    /// Paragraph text, verbatim from the normalized document
    pub paragraph: String,

    /// Number of whole-word keyword occurrences
    pub density: usize,

    /// Tier derived from the density
    pub importance: Importance,
}

/// Number of paragraphs per importance tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    /// Paragraphs classified high
    pub high: usize,

    /// Paragraphs classified medium
    pub medium: usize,

    /// Paragraphs classified low
    pub low: usize,

    /// Total number of paragraphs
    pub total_paragraphs: usize,

    /// Number of keywords used for scoring
    pub total_keywords: usize,
}

impl TierCounts {
    /// Tally records scored against `total_keywords` keywords.
    pub fn from_records(records: &[ImportanceRecord], total_keywords: usize) -> Self {
        let mut counts = Self {
            total_paragraphs: records.len(),
            total_keywords,
            ..Self::default()
        };
        for record in records {
            match record.importance {
                Importance::High => counts.high += 1,
                Importance::Medium => counts.medium += 1,
                Importance::Low => counts.low += 1,
            }
        }
        counts
    }
}
