//! Cleanup of raw keyword lists from the extraction model.

/// Keywords shorter than this after cleanup are discarded.
const MIN_KEYWORD_CHARS: usize = 3;

/// Clean one raw keyword.
///
/// Lowercases, turns underscores into spaces, removes digits and collapses
/// whitespace. Returns `None` when fewer than three characters remain.
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase().replace('_', " ");
    let without_digits: String = lowered.chars().filter(|c| !c.is_numeric()).collect();
    let keyword = without_digits.split_whitespace().collect::<Vec<_>>().join(" ");

    if keyword.chars().count() < MIN_KEYWORD_CHARS {
        return None;
    }
    Some(keyword)
}

/// Clean a keyword list, dropping rejects and duplicates while keeping the
/// first occurrence order.
pub fn clean_keywords<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(raw.len());
    for keyword in raw.iter().filter_map(|k| normalize_keyword(k.as_ref())) {
        if !cleaned.contains(&keyword) {
            cleaned.push(keyword);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keyword() {
        assert_eq!(normalize_keyword("  Force_Majeure "), Some("force majeure".to_string()));
        assert_eq!(normalize_keyword("Section 42 notice"), Some("section notice".to_string()));
        assert_eq!(normalize_keyword("TENANT"), Some("tenant".to_string()));
    }

    #[test]
    fn test_normalize_keyword_rejects_short() {
        assert_eq!(normalize_keyword(""), None);
        assert_eq!(normalize_keyword("ab"), None);
        assert_eq!(normalize_keyword("12a"), None);
        assert_eq!(normalize_keyword("_ _"), None);
    }

    #[test]
    fn test_clean_keywords_dedupes_in_order() {
        let raw = ["Tenant", "lease_term", "tenant", "42", "LEASE TERM", "rent"];
        assert_eq!(clean_keywords(&raw), vec!["tenant", "lease term", "rent"]);
    }
}
