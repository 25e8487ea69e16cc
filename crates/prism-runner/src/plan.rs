//! Invocation plans - concrete spawn parameters for one request

use prism_domain::{AnalysisKind, AnalysisRequest, ContentKind, EventSink, PipelineEvent};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Suffix appended to a payload cut at the length limit
pub const TRUNCATION_MARKER: &str = "\n\n[... input truncated ...]";

/// Default analyzer executable
pub const DEFAULT_EXECUTABLE: &str = "fabric";

/// Installation directories appended to the inherited search path
pub const DEFAULT_SEARCH_PATHS: &[&str] = &[
    "/usr/local/bin",
    "/opt/homebrew/bin",
    "/usr/local/go/bin",
    "~/go/bin",
    "~/.local/bin",
];

/// How the payload reaches the analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputDelivery {
    /// Written to standard input, then stdin is closed
    Stdin(String),

    /// Already part of the argument list; stdin is not connected
    Argument,
}

/// Settings that shape every plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Analyzer executable (bare name or path)
    pub executable: PathBuf,

    /// Directories appended to `PATH` for the child process
    pub extra_search_paths: Vec<String>,

    /// Pattern name overrides keyed by analysis kind name
    pub pattern_overrides: BTreeMap<String, String>,
}

impl RunnerSettings {
    /// Pattern name for an analysis kind, honoring overrides
    pub fn pattern_for(&self, kind: AnalysisKind) -> &str {
        self.pattern_overrides
            .get(kind.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_pattern())
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            extra_search_paths: DEFAULT_SEARCH_PATHS.iter().map(|s| s.to_string()).collect(),
            pattern_overrides: BTreeMap::new(),
        }
    }
}

/// Everything needed to spawn the analyzer once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    /// Executable to run
    pub program: PathBuf,

    /// Arguments, in order
    pub args: Vec<String>,

    /// Payload delivery mode
    pub input: InputDelivery,

    /// Variables set on top of the inherited environment
    pub env: BTreeMap<String, OsString>,

    /// Time allowed from spawn to exit
    pub timeout: Duration,
}

impl InvocationPlan {
    /// Create a plan with no input and a 60 second timeout
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            input: InputDelivery::Argument,
            env: BTreeMap::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Deliver a payload on standard input
    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.input = InputDelivery::Stdin(payload.into());
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an environment variable for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Build the plan for a request
    ///
    /// Video URLs go on the command line (`--youtube <url> --transcript`);
    /// everything else is piped to stdin, truncated to the request's limit.
    /// Truncation is reported to `events`.
    pub fn for_request(
        request: &AnalysisRequest,
        settings: &RunnerSettings,
        events: &dyn EventSink,
    ) -> Self {
        let pattern = settings.pattern_for(request.analysis_kind).to_string();

        let (args, input) = match request.content_kind {
            ContentKind::VideoUrl => (
                vec![
                    "--youtube".to_string(),
                    request.raw_input.trim().to_string(),
                    "--transcript".to_string(),
                    "--pattern".to_string(),
                    pattern,
                ],
                InputDelivery::Argument,
            ),
            ContentKind::Text | ContentKind::GenericUrl => {
                let payload = truncate_payload(&request.raw_input, request.max_input_length);
                if let Cow::Owned(_) = payload {
                    let original_chars = request.input_chars();
                    warn!(
                        "Input truncated from {} to {} chars",
                        original_chars, request.max_input_length
                    );
                    events.record(PipelineEvent::Truncated {
                        original_chars,
                        kept_chars: request.max_input_length,
                    });
                }
                (
                    vec!["--pattern".to_string(), pattern],
                    InputDelivery::Stdin(payload.into_owned()),
                )
            }
        };

        let mut plan = Self::new(settings.executable.clone(), args).with_timeout(request.timeout());
        plan.input = input;

        if let Some(path) = search_path_overlay(env::var_os("PATH"), &settings.extra_search_paths) {
            plan.env.insert("PATH".to_string(), path);
        }

        debug!("Built invocation plan: {} {}", plan.program.display(), plan.args.join(" "));
        plan
    }

    /// Whether the payload is written to stdin
    pub fn uses_stdin(&self) -> bool {
        matches!(self.input, InputDelivery::Stdin(_))
    }
}

/// Cut `text` to `max_chars` characters and append [`TRUNCATION_MARKER`]
///
/// Text within the limit is returned unchanged (borrowed). Characters are
/// Unicode scalar values, so a multi-byte character is never split.
///
/// # Examples
///
/// ```
/// use prism_runner::{truncate_payload, TRUNCATION_MARKER};
///
/// let cut = truncate_payload("abcdefghijklmno", 10);
/// assert_eq!(cut, format!("abcdefghij{}", TRUNCATION_MARKER));
/// assert_eq!(truncate_payload("short", 10), "short");
/// ```
pub fn truncate_payload(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            let mut cut = String::with_capacity(byte_index + TRUNCATION_MARKER.len());
            cut.push_str(&text[..byte_index]);
            cut.push_str(TRUNCATION_MARKER);
            Cow::Owned(cut)
        }
        None => Cow::Borrowed(text),
    }
}

/// Append `extra` directories to an inherited search path
///
/// `~` is expanded to the home directory and directories already present
/// are skipped. Returns `None` when the result cannot be represented (an
/// entry contains the platform separator).
pub fn search_path_overlay(inherited: Option<OsString>, extra: &[String]) -> Option<OsString> {
    let mut paths: Vec<PathBuf> = inherited
        .map(|value| env::split_paths(&value).collect())
        .unwrap_or_default();

    for dir in extra {
        let dir = expand_home(dir);
        if !paths.contains(&dir) {
            paths.push(dir);
        }
    }

    match env::join_paths(paths) {
        Ok(joined) => Some(joined),
        Err(e) => {
            warn!("Search path overlay skipped: {}", e);
            None
        }
    }
}

fn expand_home(dir: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (dir, home) {
        ("~", Some(home)) => home,
        (d, Some(home)) if d.starts_with("~/") => home.join(&d[2..]),
        (d, _) => PathBuf::from(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_domain::MemorySink;

    fn request(input: &str, max: usize) -> AnalysisRequest {
        AnalysisRequest::new(input, AnalysisKind::Rating, max, 5_000)
    }

    #[test]
    fn test_truncation_is_exact() {
        let input = "abcdefghijklmno";
        for _ in 0..3 {
            let cut = truncate_payload(input, 10);
            assert_eq!(cut, format!("abcdefghij{}", TRUNCATION_MARKER));
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let cut = truncate_payload("ééééé", 2);
        assert_eq!(cut, format!("éé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_no_truncation_at_limit() {
        assert!(matches!(truncate_payload("abcde", 5), Cow::Borrowed("abcde")));
    }

    #[test]
    fn test_text_plan_uses_stdin() {
        let sink = MemorySink::new();
        let plan = InvocationPlan::for_request(&request("hello", 100), &RunnerSettings::default(), &sink);
        assert_eq!(plan.program, PathBuf::from("fabric"));
        assert_eq!(plan.args, vec!["--pattern", "rate_content"]);
        assert_eq!(plan.input, InputDelivery::Stdin("hello".to_string()));
        assert_eq!(plan.timeout, Duration::from_secs(5));
        assert!(!sink.has_stage("truncate"));
    }

    #[test]
    fn test_generic_url_plan_uses_stdin() {
        let sink = MemorySink::new();
        let plan = InvocationPlan::for_request(
            &request("https://example.com/post", 100),
            &RunnerSettings::default(),
            &sink,
        );
        assert!(plan.uses_stdin());
    }

    #[test]
    fn test_video_plan_passes_url_as_argument() {
        let sink = MemorySink::new();
        let req = AnalysisRequest::new(
            " https://youtu.be/dQw4w9WgXcQ ",
            AnalysisKind::Wisdom,
            100,
            1_000,
        );
        let plan = InvocationPlan::for_request(&req, &RunnerSettings::default(), &sink);
        assert_eq!(
            plan.args,
            vec![
                "--youtube",
                "https://youtu.be/dQw4w9WgXcQ",
                "--transcript",
                "--pattern",
                "extract_wisdom"
            ]
        );
        assert_eq!(plan.input, InputDelivery::Argument);
    }

    #[test]
    fn test_truncation_is_reported() {
        let sink = MemorySink::new();
        let plan = InvocationPlan::for_request(
            &request("abcdefghijklmno", 10),
            &RunnerSettings::default(),
            &sink,
        );
        assert_eq!(
            plan.input,
            InputDelivery::Stdin(format!("abcdefghij{}", TRUNCATION_MARKER))
        );
        let events = sink.events();
        assert_eq!(
            events[0].event,
            PipelineEvent::Truncated { original_chars: 15, kept_chars: 10 }
        );
    }

    #[test]
    fn test_pattern_override() {
        let mut settings = RunnerSettings::default();
        settings
            .pattern_overrides
            .insert("rating".to_string(), "my_rating".to_string());
        assert_eq!(settings.pattern_for(AnalysisKind::Rating), "my_rating");
        assert_eq!(settings.pattern_for(AnalysisKind::Swot), "analyze_swot");
    }

    #[test]
    fn test_search_path_overlay_appends_and_dedupes() {
        let inherited = env::join_paths(["/usr/bin", "/bin"]).ok();
        let extra = vec!["/opt/tools".to_string(), "/bin".to_string()];
        let overlay = search_path_overlay(inherited, &extra).unwrap();
        let paths: Vec<PathBuf> = env::split_paths(&overlay).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
                PathBuf::from("/opt/tools")
            ]
        );
    }

    #[test]
    fn test_search_path_overlay_without_inherited_path() {
        let overlay = search_path_overlay(None, &["/opt/tools".to_string()]).unwrap();
        assert_eq!(overlay, OsString::from("/opt/tools"));
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/go/bin"), home.join("go/bin"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("/usr/local/bin"), PathBuf::from("/usr/local/bin"));
    }
}
