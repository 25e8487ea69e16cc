//! Configuration for the Analyzer

use prism_domain::AnalysisKind;
use prism_runner::{RunnerSettings, DEFAULT_EXECUTABLE, DEFAULT_SEARCH_PATHS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Analyzer executable (bare name resolved through `PATH`, or a path)
    pub executable: String,

    /// Maximum payload length delivered to the analyzer (characters)
    pub max_input_length: usize,

    /// Maximum time for a single analyzer run (seconds)
    pub timeout_secs: u64,

    /// Directory holding one CSV file per analysis kind
    pub export_dir: PathBuf,

    /// Whether records are appended to the export files
    pub export_enabled: bool,

    /// Directories appended to `PATH` for the analyzer process
    pub extra_search_paths: Vec<String>,

    /// Pattern name overrides keyed by analysis kind (`rating = "my_rating"`)
    pub patterns: BTreeMap<String, String>,
}

impl AnalyzerConfig {
    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Timeout in milliseconds, as carried by a request
    pub fn timeout_millis(&self) -> u64 {
        self.timeout_secs.saturating_mul(1000)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.executable.trim().is_empty() {
            return Err("executable must not be empty".to_string());
        }
        if self.max_input_length == 0 {
            return Err("max_input_length must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.export_enabled && self.export_dir.as_os_str().is_empty() {
            return Err("export_dir must be set when export is enabled".to_string());
        }
        for (kind, pattern) in &self.patterns {
            if AnalysisKind::parse(kind).is_none() {
                return Err(format!("unknown analysis kind in patterns: {}", kind));
            }
            if pattern.trim().is_empty() {
                return Err(format!("pattern for {} must not be empty", kind));
            }
        }
        Ok(())
    }

    /// Settings for building invocation plans
    ///
    /// Pattern keys are normalized, so `sb7 = "..."` overrides the
    /// storybrand pattern.
    pub fn runner_settings(&self) -> RunnerSettings {
        let pattern_overrides = self
            .patterns
            .iter()
            .filter_map(|(kind, pattern)| {
                AnalysisKind::parse(kind).map(|k| (k.as_str().to_string(), pattern.clone()))
            })
            .collect();

        RunnerSettings {
            executable: PathBuf::from(&self.executable),
            extra_search_paths: self.extra_search_paths.clone(),
            pattern_overrides,
        }
    }

    /// Default export directory: `~/.prism/exports`
    pub fn default_export_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".prism")
            .join("exports")
    }
}

impl Default for AnalyzerConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            max_input_length: 50_000,
            timeout_secs: 120,
            export_dir: Self::default_export_dir(),
            export_enabled: true,
            extra_search_paths: DEFAULT_SEARCH_PATHS.iter().map(|s| s.to_string()).collect(),
            patterns: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Aggressive preset: short inputs and timeouts for quick feedback
    pub fn aggressive() -> Self {
        Self {
            max_input_length: 20_000,
            timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Lenient preset: long inputs and generous timeouts for slow models
    pub fn lenient() -> Self {
        Self {
            max_input_length: 100_000,
            timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.executable, "fabric");
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.timeout_millis(), 120_000);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(AnalyzerConfig::aggressive().validate().is_ok());
        assert!(AnalyzerConfig::lenient().validate().is_ok());
        assert!(AnalyzerConfig::aggressive().timeout_secs < AnalyzerConfig::lenient().timeout_secs);
    }

    #[test]
    fn test_invalid_max_input_length() {
        let mut config = AnalyzerConfig::default();
        config.max_input_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = AnalyzerConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_pattern_kind() {
        let mut config = AnalyzerConfig::default();
        config.patterns.insert("poetry".to_string(), "write_poem".to_string());
        assert!(config.validate().unwrap_err().contains("poetry"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AnalyzerConfig::from_toml("timeout_secs = 30\n[patterns]\nsb7 = \"my_sb7\"\n").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_input_length, 50_000);

        let settings = config.runner_settings();
        assert_eq!(settings.pattern_for(AnalysisKind::StoryBrand), "my_sb7");
        assert_eq!(settings.pattern_for(AnalysisKind::Rating), "rate_content");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalyzerConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = AnalyzerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
