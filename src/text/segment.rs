//! Paragraph segmentation.
//!
//! Text is split on blank lines first, then each chunk is split again at
//! sentence-like boundaries: a period, whitespace, then an uppercase letter.
//! OCR frequently merges paragraphs, so the second split recovers clause
//! boundaries that lost their blank line. Numbered clause markers (`1.`,
//! `12.`) are never boundaries. Abbreviations such as `U.S. Code` do split.

use regex::Regex;

/// Default minimum paragraph length in characters.
pub const DEFAULT_MIN_PARAGRAPH_CHARS: usize = 40;

/// Options for paragraph segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Fragments with fewer characters than this are dropped as noise
    pub min_chars: usize,
}

impl SegmentOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum paragraph length.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_PARAGRAPH_CHARS,
        }
    }
}

/// Splits normalized text into paragraphs.
#[derive(Debug, Clone)]
pub struct Segmenter {
    options: SegmentOptions,
    blank_line: Regex,
}

impl Segmenter {
    /// Create a segmenter with the given options.
    pub fn new(options: SegmentOptions) -> Self {
        Self {
            options,
            blank_line: Regex::new(r"\n[^\S\n]*\n\s*").expect("static regex"),
        }
    }

    /// The options this segmenter was built with.
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Split `text` into paragraphs in reading order.
    ///
    /// Every returned paragraph is a trimmed substring of `text` with at
    /// least `min_chars` characters.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.blank_line
            .split(text)
            .flat_map(split_sentences)
            .map(str::trim)
            .filter(|fragment| fragment.chars().count() >= self.options.min_chars)
            .collect()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentOptions::default())
    }
}

/// Split text into paragraphs with default options.
pub fn split_into_paragraphs(text: &str) -> Vec<String> {
    Segmenter::default()
        .segment(text)
        .into_iter()
        .map(String::from)
        .collect()
}

/// Split a chunk after every period that is followed by whitespace and an
/// uppercase letter, except periods closing a numbered marker.
fn split_sentences(chunk: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut chars = chunk.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != '.' || is_numbered_marker(&chunk[start..idx]) {
            continue;
        }

        let mut saw_space = false;
        while let Some(&(_, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            saw_space = true;
            chars.next();
        }

        if let Some(&(next_idx, next)) = chars.peek() {
            if saw_space && next.is_uppercase() {
                fragments.push(&chunk[start..=idx]);
                start = next_idx;
            }
        }
    }

    if start < chunk.len() {
        fragments.push(&chunk[start..]);
    }
    fragments
}

/// Whether `before` (the text preceding a period) ends with a 1–3 digit
/// list marker such as `2.` or `(3.`. A marker must open the fragment or
/// follow a sentence-ending period, so `Section 12.` is a sentence end.
fn is_numbered_marker(before: &str) -> bool {
    let digits = before
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 || digits > 3 {
        return false;
    }

    let head = &before[..before.len() - digits];
    let head = head.strip_suffix('(').unwrap_or(head);
    let trimmed = head.trim_end();
    if trimmed.is_empty() {
        return true;
    }
    trimmed.len() < head.len() && trimmed.ends_with('.')
}
