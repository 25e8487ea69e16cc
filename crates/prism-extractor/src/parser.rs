//! Parse analyzer output into schema fields
//!
//! Every lookup runs independently over the full response text, so one
//! field's match never hides text from another. Nothing here fails: a
//! field that does not match is simply absent.

use crate::types::ExtractedFields;
use prism_domain::{AnalysisRecord, AnalysisRequest, ExtractionSchema};
use regex::Regex;
use tracing::{debug, warn};

/// Highest value accepted for an `N/10` score
pub const MAX_SCORE: u32 = 10;

/// Extract every field a schema declares
///
/// # Examples
///
/// ```
/// use prism_domain::AnalysisKind;
/// use prism_extractor::extract_fields;
///
/// let fields = extract_fields("Clarity: 7/10", AnalysisKind::Rating.schema());
/// assert_eq!(fields.scores["Clarity"], Some(7));
/// assert_eq!(fields.scores["Persuasion"], None);
/// ```
pub fn extract_fields(text: &str, schema: &ExtractionSchema) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    for keyword in schema.scored {
        fields.scores.insert(keyword.to_string(), find_score(text, keyword));
    }
    for label in schema.labeled {
        fields.labels.insert(label.to_string(), find_label(text, label));
    }
    for heading in schema.lists {
        fields
            .lists
            .insert(heading.to_string(), find_list(text, heading, schema.lists));
    }

    debug!(
        "Extracted {}/{} fields",
        fields.matched(),
        schema.field_count()
    );
    fields
}

/// Extract a response into a record for `request`
pub fn extract(text: &str, request: &AnalysisRequest) -> AnalysisRecord {
    extract_fields(text, request.analysis_kind.schema()).into_record(request, text)
}

/// First `N/10` score following `keyword`
///
/// The score may sit further along the line or on a later line. Values
/// above ten resolve to `None`; later repeats are never consulted.
pub fn find_score(text: &str, keyword: &str) -> Option<u8> {
    let pattern = format!(
        r"(?is){}(?:.*?\D)?(\d+)\s*/\s*10\b",
        regex::escape(keyword)
    );
    let re = compile(&pattern)?;
    let digits = re.captures(text)?.get(1)?.as_str();

    match digits.parse::<u32>() {
        Ok(score) if score <= MAX_SCORE => u8::try_from(score).ok(),
        _ => {
            debug!("Score for {} out of range: {}/10", keyword, digits);
            None
        }
    }
}

/// Remainder of the first `label:` line, trimmed
///
/// Leading markdown decoration (`#`, `*`, `_`, `>`, `-`) and emphasis
/// around the colon are tolerated. A label with nothing after the colon
/// resolves to an empty string; only a missing label is `None`.
pub fn find_label(text: &str, label: &str) -> Option<String> {
    let pattern = format!(
        r"(?im)^[ \t#*_>\-]*{}[*_]*[ \t]*:[*_]*(.*)$",
        regex::escape(label)
    );
    let re = compile(&pattern)?;
    let value = re.captures(text)?.get(1)?.as_str();
    Some(value.trim().trim_end_matches(['*', '_']).trim().to_string())
}

/// Bullet items following the `heading` line
///
/// Blank lines directly after the heading are skipped. Once the section
/// has any content, a blank line ends it, as do another heading in
/// `headings`, a markdown `#` heading and the end of the text. Lines
/// inside the section that are not bullets are ignored.
pub fn find_list(text: &str, heading: &str, headings: &[&str]) -> Vec<String> {
    let mut lines = text.lines();
    if !lines.by_ref().any(|line| is_heading(line, heading)) {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut started = false;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if started {
                break;
            }
            continue;
        }
        started = true;
        if trimmed.starts_with('#') || headings.iter().any(|h| is_heading(line, h)) {
            break;
        }
        if let Some(item) = strip_bullet(trimmed) {
            if !item.is_empty() {
                items.push(item.to_string());
            }
        }
    }
    items
}

/// Whether `line` is a heading for `heading`
///
/// Markdown decoration and one trailing colon are ignored; the comparison
/// is case-insensitive.
fn is_heading(line: &str, heading: &str) -> bool {
    let text = line
        .trim()
        .trim_start_matches(['#', '*', '_', '>'])
        .trim_end_matches(['*', '_'])
        .trim();
    let text = text.strip_suffix(':').unwrap_or(text);
    let text = text.trim_end_matches(['*', '_']).trim();

    text.to_lowercase() == heading.to_lowercase()
}

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('•'))?;

    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Skipping field, pattern failed to compile: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_domain::AnalysisKind;

    #[test]
    fn test_score_with_absent_sibling() {
        let fields = extract_fields("Clarity: 7/10", AnalysisKind::Rating.schema());
        assert_eq!(fields.scores["Clarity"], Some(7));
        assert_eq!(fields.scores["Persuasion"], None);
    }

    #[test]
    fn test_score_variants() {
        assert_eq!(find_score("**Clarity**: 8 / 10", "clarity"), Some(8));
        assert_eq!(find_score("CLARITY - rated 10/10 overall", "Clarity"), Some(10));
        assert_eq!(find_score("Clarity 0/10", "Clarity"), Some(0));
        assert_eq!(find_score("Overall score (out of 10): 6/10", "Overall"), Some(6));
    }

    #[test]
    fn test_score_first_match_wins() {
        let text = "Clarity: 4/10\nLater, Clarity improved to 9/10";
        assert_eq!(find_score(text, "Clarity"), Some(4));
    }

    #[test]
    fn test_score_on_following_line() {
        assert_eq!(find_score("Clarity:\n7/10", "Clarity"), Some(7));
        assert_eq!(
            find_score("## Clarity\n\nThe argument is easy to follow.\nScore: 8/10", "Clarity"),
            Some(8)
        );
    }

    #[test]
    fn test_score_out_of_range_is_absent() {
        assert_eq!(find_score("Clarity: 12/10", "Clarity"), None);
        assert_eq!(find_score("Clarity: 7/100", "Clarity"), None);
    }

    #[test]
    fn test_label_extraction() {
        let text = "Intro\n## Verdict: Worth reading\nSummary: short";
        assert_eq!(find_label(text, "verdict"), Some("Worth reading".to_string()));
        assert_eq!(find_label(text, "Summary"), Some("short".to_string()));
        assert_eq!(find_label(text, "Guide"), None);
    }

    #[test]
    fn test_label_with_emphasis() {
        assert_eq!(
            find_label("**Call to Action:** Sign up today", "Call to Action"),
            Some("Sign up today".to_string())
        );
        assert_eq!(
            find_label("- *Problem*: churn is rising", "Problem"),
            Some("churn is rising".to_string())
        );
    }

    #[test]
    fn test_label_must_start_the_line() {
        assert_eq!(find_label("The Problem: none", "Problem"), None);
    }

    #[test]
    fn test_empty_label_is_present_but_blank() {
        assert_eq!(
            find_label("Summary:\nText on the next line", "Summary"),
            Some(String::new())
        );
        assert_eq!(find_label("**Summary:**  ", "Summary"), Some(String::new()));
        assert_eq!(find_label("No labels here", "Summary"), None);
    }

    #[test]
    fn test_list_section() {
        let text = "Recommendations:\n- Do X\n- Do Y\n\nNext section";
        assert_eq!(
            find_list(text, "Recommendations", &["Recommendations"]),
            vec!["Do X", "Do Y"]
        );
    }

    #[test]
    fn test_list_section_markdown_heading() {
        let text = "# IDEAS\n\n* First idea\n• Second idea\n-not a bullet\n\n# INSIGHTS\n- One insight";
        let headings = AnalysisKind::Wisdom.schema().lists;
        assert_eq!(find_list(text, "Ideas", headings), vec!["First idea", "Second idea"]);
        assert_eq!(find_list(text, "Insights", headings), vec!["One insight"]);
    }

    #[test]
    fn test_list_stops_at_next_declared_heading() {
        let text = "Strengths:\n- Brand\nWeaknesses:\n- Cost";
        let headings = AnalysisKind::Swot.schema().lists;
        assert_eq!(find_list(text, "Strengths", headings), vec!["Brand"]);
        assert_eq!(find_list(text, "Weaknesses", headings), vec!["Cost"]);
    }

    #[test]
    fn test_missing_or_empty_section_is_empty() {
        let headings = AnalysisKind::Swot.schema().lists;
        assert!(find_list("nothing here", "Threats", headings).is_empty());
        assert!(find_list("Threats:\n\nplain prose", "Threats", headings).is_empty());
    }

    #[test]
    fn test_prose_section_does_not_borrow_later_bullets() {
        let headings = AnalysisKind::Swot.schema().lists;
        let text = "Strengths:\nNone identified.\n\nAppendix notes:\n- stray unrelated bullet";
        assert!(find_list(text, "Strengths", headings).is_empty());
    }

    #[test]
    fn test_blank_lines_after_heading_are_skipped() {
        let headings = AnalysisKind::Swot.schema().lists;
        let text = "Threats:\n\n\n- Competition\n- Regulation\n\n- Unrelated";
        assert_eq!(find_list(text, "Threats", headings), vec!["Competition", "Regulation"]);
    }

    #[test]
    fn test_every_declared_field_is_present() {
        for kind in AnalysisKind::ALL {
            let fields = extract_fields("", kind.schema());
            assert_eq!(fields.declared(), kind.schema().field_count());
            assert_eq!(fields.matched(), 0);
        }
    }
}
