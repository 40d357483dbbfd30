//! Text normalization for PDF and OCR output.
//!
//! The passes run in a fixed order; later passes assume the effects of the
//! earlier ones:
//!
//! 1. control characters are stripped (plus line-ending, Unicode and
//!    ligature cleanup)
//! 2. horizontal whitespace runs collapse to one space
//! 3. three or more newlines collapse to a paragraph break
//! 4. line-wrap hyphenation is undone (`infor-\nmation` → `information`)
//! 5. standalone page-number lines (1–3 digits) are dropped
//! 6. every remaining whitespace run collapses to one space and the result is trimmed
//!
//! The output is a fixed point: normalizing it again changes nothing.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Options for text normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub unicode_nfc: bool,

    /// Fold typographic ligatures (ﬁ, ﬂ, ...) into plain letters
    pub fold_ligatures: bool,

    /// Remove standalone numeric lines of at most three digits
    pub remove_page_numbers: bool,

    /// Rejoin words hyphenated at a line break
    pub fix_hyphenation: bool,
}

impl NormalizeOptions {
    /// Create options with every pass enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_nfc(mut self, enabled: bool) -> Self {
        self.unicode_nfc = enabled;
        self
    }

    /// Enable or disable ligature folding.
    pub fn with_fold_ligatures(mut self, enabled: bool) -> Self {
        self.fold_ligatures = enabled;
        self
    }

    /// Enable or disable page-number removal.
    pub fn with_remove_page_numbers(mut self, enabled: bool) -> Self {
        self.remove_page_numbers = enabled;
        self
    }

    /// Enable or disable hyphenation repair.
    pub fn with_fix_hyphenation(mut self, enabled: bool) -> Self {
        self.fix_hyphenation = enabled;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            unicode_nfc: true,
            fold_ligatures: true,
            remove_page_numbers: true,
            fix_hyphenation: true,
        }
    }
}

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),  // ﬀ
    ('\u{FB01}', "fi"),  // ﬁ
    ('\u{FB02}', "fl"),  // ﬂ
    ('\u{FB03}', "ffi"), // ﬃ
    ('\u{FB04}', "ffl"), // ﬄ
    ('\u{FB05}', "st"),  // ﬅ (long s + t)
    ('\u{FB06}', "st"),  // ﬆ
];

/// Compiled normalization pipeline.
///
/// Build once and reuse; the regexes are compiled in [`Normalizer::new`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    options: NormalizeOptions,
    horizontal_ws: Regex,
    excess_newlines: Regex,
    line_hyphen: Regex,
    page_number_line: Regex,
    any_ws: Regex,
}

impl Normalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            horizontal_ws: Regex::new(r"[^\S\n]+").expect("static regex"),
            excess_newlines: Regex::new(r"\n(?:[^\S\n]*\n){2,}").expect("static regex"),
            line_hyphen: Regex::new(r"(\p{L})-[^\S\n]?\n[^\S\n]?(\p{L})").expect("static regex"),
            page_number_line: Regex::new(r"(?m)^[^\S\n]*\d{1,3}[^\S\n]*$").expect("static regex"),
            any_ws: Regex::new(r"\s+").expect("static regex"),
        }
    }

    /// The options this normalizer was built with.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize raw extracted text into a single canonical line.
    pub fn normalize(&self, raw: &str) -> String {
        // Stage 1: characters
        let mut text = strip_control_chars(raw);
        if self.options.fold_ligatures {
            text = fold_ligatures(&text);
        }
        if self.options.unicode_nfc {
            text = text.nfc().collect();
        }

        // Stage 2: line structure
        text = self.horizontal_ws.replace_all(&text, " ").to_string();
        text = self.excess_newlines.replace_all(&text, "\n\n").to_string();
        if self.options.fix_hyphenation {
            text = self.line_hyphen.replace_all(&text, "$1$2").to_string();
        }
        if self.options.remove_page_numbers {
            text = self.page_number_line.replace_all(&text, "").to_string();
        }

        // Stage 3: flatten
        self.any_ws.replace_all(&text, " ").trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

/// Normalize text with default options.
pub fn normalize(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}

/// Drop control characters that are not whitespace, and turn CR / CRLF
/// line endings into `\n`.
fn strip_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push('\n');
                }
            }
            c if c.is_control() && !c.is_whitespace() => {}
            c => out.push(c),
        }
    }
    out
}

fn fold_ligatures(text: &str) -> String {
    if !text.chars().any(|c| ('\u{FB00}'..='\u{FB06}').contains(&c)) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match LIGATURES.iter().find(|(lig, _)| *lig == c) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}
