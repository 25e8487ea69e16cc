//! Analysis request - one immutable unit of work for the pipeline

use crate::content::{classify, ContentKind};
use crate::schema::AnalysisKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A request to analyze one input
///
/// Created per invocation and never mutated; the content kind is assigned
/// once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Input exactly as the caller supplied it
    pub raw_input: String,

    /// Classification of `raw_input`
    pub content_kind: ContentKind,

    /// Which schema and pattern apply
    pub analysis_kind: AnalysisKind,

    /// Maximum payload length delivered to the analyzer (characters)
    pub max_input_length: usize,

    /// Time allowed for the analyzer process (milliseconds)
    pub timeout_millis: u64,
}

impl AnalysisRequest {
    /// Create a request, classifying the input
    ///
    /// # Examples
    ///
    /// ```
    /// use prism_domain::{AnalysisKind, AnalysisRequest, ContentKind};
    ///
    /// let request = AnalysisRequest::new("https://example.com", AnalysisKind::Rating, 1000, 5000);
    /// assert_eq!(request.content_kind, ContentKind::GenericUrl);
    /// ```
    pub fn new(
        raw_input: impl Into<String>,
        analysis_kind: AnalysisKind,
        max_input_length: usize,
        timeout_millis: u64,
    ) -> Self {
        let raw_input = raw_input.into();
        let content_kind = classify(&raw_input);
        Self {
            raw_input,
            content_kind,
            analysis_kind,
            max_input_length,
            timeout_millis,
        }
    }

    /// The timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }

    /// Length of the raw input in characters
    pub fn input_chars(&self) -> usize {
        self.raw_input.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_classifies_input() {
        let request = AnalysisRequest::new(
            "https://youtu.be/dQw4w9WgXcQ",
            AnalysisKind::Wisdom,
            100,
            1000,
        );
        assert_eq!(request.content_kind, ContentKind::VideoUrl);
        assert_eq!(request.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_input_chars_counts_characters() {
        let request = AnalysisRequest::new("héllo", AnalysisKind::Rating, 100, 1000);
        assert_eq!(request.input_chars(), 5);
        assert_eq!(request.content_kind, ContentKind::Text);
    }
}
