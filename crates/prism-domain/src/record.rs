//! Analysis record - the typed result of extracting a response

use crate::content::ContentKind;
use crate::schema::AnalysisKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed output of one analysis
///
/// Every field declared by the kind's schema is present as a key; a field
/// the response did not contain maps to `None` (scored/labeled) or an
/// empty list. The full response and the original input are always kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// When the record was produced
    pub timestamp: DateTime<Utc>,

    /// Classification of the original input
    pub content_kind: ContentKind,

    /// Which schema produced the fields
    pub analysis_kind: AnalysisKind,

    /// `N/10` scores keyed by field name
    pub scores: BTreeMap<String, Option<u8>>,

    /// Single-line labeled values keyed by field name
    pub labels: BTreeMap<String, Option<String>>,

    /// Bulleted sections keyed by field name
    pub lists: BTreeMap<String, Vec<String>>,

    /// Untouched analyzer output
    pub response_text: String,

    /// Input as the caller supplied it
    pub original_input: String,
}

impl AnalysisRecord {
    /// Score for a field, if it was found
    pub fn score(&self, field: &str) -> Option<u8> {
        self.scores.get(field).copied().flatten()
    }

    /// Labeled value for a field, if it was found
    pub fn label(&self, field: &str) -> Option<&str> {
        self.labels.get(field).and_then(|v| v.as_deref())
    }

    /// Items of a list section (empty when absent)
    pub fn list(&self, field: &str) -> &[String] {
        self.lists.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of declared fields that matched
    ///
    /// A list section counts as matched when it has at least one item.
    pub fn matched_fields(&self) -> usize {
        self.scores.values().filter(|v| v.is_some()).count()
            + self.labels.values().filter(|v| v.is_some()).count()
            + self.lists.values().filter(|v| !v.is_empty()).count()
    }

    /// Number of declared fields
    pub fn declared_fields(&self) -> usize {
        self.scores.len() + self.labels.len() + self.lists.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AnalysisRecord {
        let mut scores = BTreeMap::new();
        scores.insert("Clarity".to_string(), Some(7));
        scores.insert("Persuasion".to_string(), None);

        let mut labels = BTreeMap::new();
        labels.insert("Verdict".to_string(), Some("Solid".to_string()));

        let mut lists = BTreeMap::new();
        lists.insert("Ideas".to_string(), vec![]);

        AnalysisRecord {
            timestamp: Utc::now(),
            content_kind: ContentKind::Text,
            analysis_kind: AnalysisKind::Rating,
            scores,
            labels,
            lists,
            response_text: "Clarity: 7/10".to_string(),
            original_input: "some text".to_string(),
        }
    }

    #[test]
    fn test_accessors() {
        let record = sample_record();
        assert_eq!(record.score("Clarity"), Some(7));
        assert_eq!(record.score("Persuasion"), None);
        assert_eq!(record.score("Missing"), None);
        assert_eq!(record.label("Verdict"), Some("Solid"));
        assert!(record.list("Ideas").is_empty());
    }

    #[test]
    fn test_match_counts() {
        let record = sample_record();
        assert_eq!(record.declared_fields(), 4);
        assert_eq!(record.matched_fields(), 2);
    }
}
