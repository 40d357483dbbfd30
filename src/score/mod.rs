//! Importance scoring of paragraphs by keyword density.

mod keywords;
mod scorer;

pub use keywords::{clean_keywords, normalize_keyword};
pub use scorer::{density, ImportanceScorer, KeywordMatcher, TierScheme, DEFAULT_HIGH_THRESHOLD};
