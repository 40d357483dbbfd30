//! JSON output for analyses.

use crate::error::{Error, Result};
use crate::pipeline::Analysis;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an analysis to JSON.
pub fn to_json(analysis: &Analysis, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(analysis),
        JsonFormat::Compact => serde_json::to_string(analysis),
    };

    result.map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractionMethod, ExtractionReport};
    use crate::model::{Importance, ImportanceRecord, PageText, TierCounts};

    fn analysis() -> Analysis {
        let records = vec![ImportanceRecord {
            paragraph: "The tenant shall pay rent on the first day of each month.".to_string(),
            density: 2,
            importance: Importance::High,
        }];
        let pages = vec![PageText::recognized(1, "The tenant shall pay rent.")];
        Analysis {
            text: records[0].paragraph.clone(),
            metrics: TierCounts::from_records(&records, 2),
            records,
            keywords: vec!["tenant".to_string(), "rent".to_string()],
            extraction: ExtractionReport::from_pages(ExtractionMethod::Digital, 1, &pages),
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&analysis(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"importance\": \"high\""));
        assert!(json.contains("\"method\": \"digital\""));
        assert!(!json.contains("fallback_reason"));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&analysis(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metrics"]["high"], 1);
        assert_eq!(value["extraction"]["pages"][0]["status"], "recognized");
    }
}
