//! Content classification - decides how a raw input is delivered to the analyzer

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Classification of a raw input
///
/// Exactly one kind is assigned to every input:
/// - Text: anything that is not a single absolute URL
/// - GenericUrl: an absolute URL that is not a known video link
/// - VideoUrl: a video-platform link carrying an 11-character video id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Plain text payload
    Text,

    /// Absolute URL of any other kind
    GenericUrl,

    /// Video-platform URL (watch, embed, shorts or short-link form)
    VideoUrl,
}

impl ContentKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::GenericUrl => "generic_url",
            ContentKind::VideoUrl => "video_url",
        }
    }

    /// Parse a kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ContentKind::Text),
            "generic_url" | "url" => Some(ContentKind::GenericUrl),
            "video_url" | "video" => Some(ContentKind::VideoUrl),
            _ => None,
        }
    }

    /// Whether this kind is any form of URL
    pub fn is_url(&self) -> bool {
        !matches!(self, ContentKind::Text)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid content kind: {}", s))
    }
}

/// `scheme://authority[path][?query][#fragment]` with no whitespace anywhere.
static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+(?:[/?#]\S*)?$")
});

static VIDEO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // watch?v=<id>, the id may follow other query parameters
        compile(
            r"(?i)^https?://(?:(?:www|m|music)\.)?youtube\.com/watch/?\?(?:\S*?&)?v=([A-Za-z0-9_-]{11})(?:[&#]\S*)?$",
        ),
        // /embed/<id>, /shorts/<id>, /live/<id>, /v/<id>
        compile(
            r"(?i)^https?://(?:(?:www|m)\.)?youtube(?:-nocookie)?\.com/(?:embed|shorts|live|v)/([A-Za-z0-9_-]{11})(?:[/?&#]\S*)?$",
        ),
        // youtu.be/<id>
        compile(r"(?i)^https?://youtu\.be/([A-Za-z0-9_-]{11})(?:[/?&#]\S*)?$"),
    ]
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in classification pattern must compile")
}

/// Classify a raw input
///
/// The input is trimmed first. Pure and total: it never fails, performs no
/// I/O, and runs in time linear in the input length.
///
/// # Examples
///
/// ```
/// use prism_domain::{classify, ContentKind};
///
/// assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ"), ContentKind::VideoUrl);
/// assert_eq!(classify("https://example.com/post"), ContentKind::GenericUrl);
/// assert_eq!(classify("just some notes"), ContentKind::Text);
/// ```
pub fn classify(raw_input: &str) -> ContentKind {
    let trimmed = raw_input.trim();

    if !is_absolute_url(trimmed) {
        return ContentKind::Text;
    }

    if VIDEO_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        ContentKind::VideoUrl
    } else {
        ContentKind::GenericUrl
    }
}

/// Whether the whole (trimmed) input is an absolute URL
pub fn is_absolute_url(input: &str) -> bool {
    ABSOLUTE_URL.is_match(input.trim())
}

/// Extract the video identifier from a video-platform URL
pub fn video_id(raw_input: &str) -> Option<String> {
    let trimmed = raw_input.trim();
    VIDEO_PATTERNS
        .iter()
        .find_map(|p| p.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(classify("hello world"), ContentKind::Text);
        assert_eq!(classify(""), ContentKind::Text);
        assert_eq!(classify("   "), ContentKind::Text);
        assert_eq!(classify("example.com"), ContentKind::Text);
    }

    #[test]
    fn test_text_containing_url_is_text() {
        assert_eq!(classify("read https://example.com later"), ContentKind::Text);
        assert_eq!(
            classify("https://example.com\nhttps://example.org"),
            ContentKind::Text
        );
    }

    #[test]
    fn test_generic_urls() {
        assert_eq!(classify("https://example.com"), ContentKind::GenericUrl);
        assert_eq!(classify("  http://example.com/a/b?c=d#e  "), ContentKind::GenericUrl);
        assert_eq!(classify("ftp://files.example.org/x.txt"), ContentKind::GenericUrl);
    }

    #[test]
    fn test_video_watch_urls() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            ContentKind::VideoUrl
        );
        assert_eq!(
            classify("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=10"),
            ContentKind::VideoUrl
        );
        assert_eq!(
            classify("https://m.youtube.com/watch?v=dQw4w9WgXcQ"),
            ContentKind::VideoUrl
        );
    }

    #[test]
    fn test_video_path_and_short_urls() {
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ"), ContentKind::VideoUrl);
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ?t=42"), ContentKind::VideoUrl);
        assert_eq!(
            classify("https://www.youtube.com/shorts/abcdefghijk"),
            ContentKind::VideoUrl
        );
        assert_eq!(
            classify("https://www.youtube-nocookie.com/embed/abc_def-123"),
            ContentKind::VideoUrl
        );
    }

    #[test]
    fn test_malformed_video_urls_fall_back_to_generic() {
        // id too short
        assert_eq!(classify("https://youtube.com/watch?v=short"), ContentKind::GenericUrl);
        // id too long
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQQ"), ContentKind::GenericUrl);
        // channel page
        assert_eq!(classify("https://www.youtube.com/@somechannel"), ContentKind::GenericUrl);
    }

    #[test]
    fn test_video_id() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(video_id("https://youtu.be/abcdefghijk").as_deref(), Some("abcdefghijk"));
        assert_eq!(video_id("https://example.com"), None);
    }

    #[test]
    fn test_kind_names() {
        for kind in [ContentKind::Text, ContentKind::GenericUrl, ContentKind::VideoUrl] {
            assert_eq!(ContentKind::parse(kind.as_str()), Some(kind));
        }
        assert!("nonsense".parse::<ContentKind>().is_err());
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(input in ".{0,200}") {
            prop_assert_eq!(classify(&input), classify(&input));
        }

        #[test]
        fn prop_video_urls_are_urls(input in ".{0,200}") {
            if classify(&input) == ContentKind::VideoUrl {
                prop_assert!(is_absolute_url(&input));
            }
        }

        #[test]
        fn prop_inputs_with_inner_whitespace_are_text(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
            let input = format!("https://{}.com {}", a, b);
            prop_assert_eq!(classify(&input), ContentKind::Text);
        }

        #[test]
        fn prop_short_links_are_video(id in "[A-Za-z0-9_-]{11}") {
            let input = format!("https://youtu.be/{}", id);
            prop_assert_eq!(classify(&input), ContentKind::VideoUrl);
            prop_assert_eq!(video_id(&input), Some(id));
        }
    }
}
