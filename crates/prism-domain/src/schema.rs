//! Analysis kinds and their extraction schemas
//!
//! A schema is static configuration: the set of fields the analyzer's
//! response is expected to contain for one kind of analysis. Adding a new
//! analysis kind means adding a variant and a schema, not new pipeline code.

use serde::{Deserialize, Serialize};

/// Declarative description of the fields expected in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSchema {
    /// Fields scored as `N/10`, identified by keyword
    pub scored: &'static [&'static str],

    /// Single-line `Label: value` fields
    pub labeled: &'static [&'static str],

    /// Bulleted sections introduced by a heading
    pub lists: &'static [&'static str],
}

impl ExtractionSchema {
    /// Total number of declared fields
    pub fn field_count(&self) -> usize {
        self.scored.len() + self.labeled.len() + self.lists.len()
    }

    /// All declared field names, in column order (scored, labeled, lists)
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.scored
            .iter()
            .chain(self.labeled.iter())
            .chain(self.lists.iter())
            .copied()
    }
}

/// Score-only rating of a piece of content
pub const RATING_SCHEMA: ExtractionSchema = ExtractionSchema {
    scored: &["Clarity", "Persuasion", "Originality", "Actionability", "Overall"],
    labeled: &["Verdict"],
    lists: &[],
};

/// Strengths / weaknesses / opportunities / threats
pub const SWOT_SCHEMA: ExtractionSchema = ExtractionSchema {
    scored: &["Overall"],
    labeled: &["Summary", "Strategic Recommendation"],
    lists: &["Strengths", "Weaknesses", "Opportunities", "Threats"],
};

/// StoryBrand seven-part narrative
pub const STORYBRAND_SCHEMA: ExtractionSchema = ExtractionSchema {
    scored: &["Clarity", "Overall"],
    labeled: &[
        "Character",
        "Problem",
        "Guide",
        "Plan",
        "Call to Action",
        "Failure",
        "Success",
    ],
    lists: &["Recommendations"],
};

/// Freeform wisdom sections
pub const WISDOM_SCHEMA: ExtractionSchema = ExtractionSchema {
    scored: &[],
    labeled: &["Summary", "One-Sentence Takeaway"],
    lists: &[
        "Ideas",
        "Insights",
        "Quotes",
        "Habits",
        "Facts",
        "References",
        "Recommendations",
    ],
};

/// Which analysis is requested, and therefore which schema applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Numeric ratings only
    Rating,

    /// SWOT analysis
    Swot,

    /// StoryBrand (SB7) narrative breakdown
    #[serde(rename = "storybrand")]
    StoryBrand,

    /// Ideas, insights, quotes and other wisdom sections
    Wisdom,
}

impl AnalysisKind {
    /// Every analysis kind, in display order
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Rating,
        AnalysisKind::Swot,
        AnalysisKind::StoryBrand,
        AnalysisKind::Wisdom,
    ];

    /// Get the kind name as a string (also used as the export file stem)
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Rating => "rating",
            AnalysisKind::Swot => "swot",
            AnalysisKind::StoryBrand => "storybrand",
            AnalysisKind::Wisdom => "wisdom",
        }
    }

    /// Parse a kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rating" | "rate" => Some(AnalysisKind::Rating),
            "swot" => Some(AnalysisKind::Swot),
            "storybrand" | "sb7" => Some(AnalysisKind::StoryBrand),
            "wisdom" => Some(AnalysisKind::Wisdom),
            _ => None,
        }
    }

    /// Default pattern name passed to the analyzer executable
    pub fn default_pattern(&self) -> &'static str {
        match self {
            AnalysisKind::Rating => "rate_content",
            AnalysisKind::Swot => "analyze_swot",
            AnalysisKind::StoryBrand => "create_storybrand",
            AnalysisKind::Wisdom => "extract_wisdom",
        }
    }

    /// The extraction schema for this kind
    pub fn schema(&self) -> &'static ExtractionSchema {
        match self {
            AnalysisKind::Rating => &RATING_SCHEMA,
            AnalysisKind::Swot => &SWOT_SCHEMA,
            AnalysisKind::StoryBrand => &STORYBRAND_SCHEMA,
            AnalysisKind::Wisdom => &WISDOM_SCHEMA,
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid analysis kind: {}", s))
    }
}
