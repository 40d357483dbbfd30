//! Keyword-density importance scoring.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::model::{Importance, ImportanceRecord};

/// Default density at which a paragraph becomes high importance.
pub const DEFAULT_HIGH_THRESHOLD: usize = 2;

/// Density thresholds mapping a paragraph to an importance tier.
///
/// The baseline is two tiers: `high` at or above `high`, `low` below it.
/// Setting `medium` adds a middle tier for `medium <= density < high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierScheme {
    /// Minimum density for high importance
    pub high: usize,

    /// Minimum density for medium importance, if the middle tier is used
    pub medium: Option<usize>,
}

impl TierScheme {
    /// Two tiers: high at `high` and above, low otherwise.
    pub fn two_tier(high: usize) -> Self {
        Self { high, medium: None }
    }

    /// Three tiers: medium from `medium`, high from `high`.
    pub fn three_tier(medium: usize, high: usize) -> Self {
        Self {
            high,
            medium: Some(medium),
        }
    }

    /// Classify a density.
    pub fn classify(&self, density: usize) -> Importance {
        if density >= self.high {
            return Importance::High;
        }
        match self.medium {
            Some(medium) if density >= medium => Importance::Medium,
            _ => Importance::Low,
        }
    }
}

impl Default for TierScheme {
    fn default() -> Self {
        Self::two_tier(DEFAULT_HIGH_THRESHOLD)
    }
}

/// A compiled keyword list counting whole-word, case-insensitive matches.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    patterns: Vec<Regex>,
}

impl KeywordMatcher {
    /// Compile a keyword list. Blank keywords are skipped.
    ///
    /// A keyword listed twice is counted twice.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let patterns = keywords
            .iter()
            .map(|kw| kw.as_ref().trim())
            .filter(|kw| !kw.is_empty())
            .filter_map(|kw| {
                match RegexBuilder::new(&regex::escape(kw))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(re) => Some(re),
                    Err(e) => {
                        log::warn!("Skipping keyword {:?}: {}", kw, e);
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Number of usable keywords.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check whether no usable keyword was supplied.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Sum of whole-word occurrences of every keyword in `paragraph`.
    pub fn density(&self, paragraph: &str) -> usize {
        self.patterns
            .iter()
            .map(|re| count_whole_words(re, paragraph))
            .sum()
    }
}

/// Count matches of `re` in `text` that are not part of a longer word.
fn count_whole_words(re: &Regex, text: &str) -> usize {
    let mut count = 0;
    let mut pos = 0;

    while let Some(m) = re.find_at(text, pos) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();

        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            count += 1;
            pos = m.end();
        } else {
            // Retry one character later; an overlapping candidate may still be whole-word.
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }

        if pos >= text.len() {
            break;
        }
    }

    count
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Keyword density of a single paragraph.
pub fn density<S: AsRef<str>>(paragraph: &str, keywords: &[S]) -> usize {
    KeywordMatcher::new(keywords).density(paragraph)
}

/// Maps paragraphs to importance records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportanceScorer {
    scheme: TierScheme,
}

impl ImportanceScorer {
    /// Create a scorer with the given tier scheme.
    pub fn new(scheme: TierScheme) -> Self {
        Self { scheme }
    }

    /// The tier scheme in use.
    pub fn scheme(&self) -> &TierScheme {
        &self.scheme
    }

    /// Score each paragraph. One record per paragraph, in the same order.
    pub fn score<P, S>(&self, paragraphs: &[P], keywords: &[S]) -> Vec<ImportanceRecord>
    where
        P: AsRef<str>,
        S: AsRef<str>,
    {
        let matcher = KeywordMatcher::new(keywords);
        self.score_with(paragraphs, &matcher)
    }

    /// Score each paragraph with an already compiled keyword list.
    pub fn score_with<P: AsRef<str>>(
        &self,
        paragraphs: &[P],
        matcher: &KeywordMatcher,
    ) -> Vec<ImportanceRecord> {
        paragraphs
            .iter()
            .map(|p| {
                let paragraph = p.as_ref();
                let density = matcher.density(paragraph);
                ImportanceRecord {
                    paragraph: paragraph.to_string(),
                    density,
                    importance: self.scheme.classify(density),
                }
            })
            .collect()
    }
}
