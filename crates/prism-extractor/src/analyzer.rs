//! Core Analyzer implementation

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::parser::extract;
use crate::types::AnalysisOutcome;
use prism_domain::{
    AnalysisKind, AnalysisRecord, AnalysisRequest, EventSink, ExportReceipt, PipelineEvent,
    RecordSink,
};
use prism_runner::{CancelToken, InvocationPlan, Invoker, RunnerSettings};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// The Analyzer runs one input through the whole pipeline
///
/// classify → plan (truncate) → invoke → extract → export
pub struct Analyzer<R, S>
where
    R: Invoker,
    S: RecordSink,
{
    runner: R,
    sink: S,
    config: AnalyzerConfig,
    settings: RunnerSettings,
}

impl<R, S> Analyzer<R, S>
where
    R: Invoker,
    S: RecordSink,
    S::Error: Display,
{
    /// Create a new Analyzer
    ///
    /// Fails if the configuration does not validate.
    pub fn new(runner: R, sink: S, config: AnalyzerConfig) -> Result<Self, AnalyzeError> {
        config.validate().map_err(AnalyzeError::Config)?;
        let settings = config.runner_settings();
        Ok(Self {
            runner,
            sink,
            config,
            settings,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Get the runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build the request for an input using the configured limits
    pub fn request(&self, input: &str, kind: AnalysisKind) -> Result<AnalysisRequest, AnalyzeError> {
        if input.trim().is_empty() {
            return Err(AnalyzeError::InvalidInput("input is empty".to_string()));
        }
        Ok(AnalysisRequest::new(
            input,
            kind,
            self.config.max_input_length,
            self.config.timeout_millis(),
        ))
    }

    /// Analyze one input
    pub async fn analyze(
        &self,
        input: &str,
        kind: AnalysisKind,
        cancel: CancelToken,
        events: &dyn EventSink,
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        let request = self.request(input, kind)?;
        self.analyze_request(&request, cancel, events).await
    }

    /// Analyze a prepared request
    pub async fn analyze_request(
        &self,
        request: &AnalysisRequest,
        cancel: CancelToken,
        events: &dyn EventSink,
    ) -> Result<AnalysisOutcome, AnalyzeError> {
        info!(
            "Analyzing {} input ({} chars) as {}",
            request.content_kind,
            request.input_chars(),
            request.analysis_kind
        );
        events.record(PipelineEvent::Classified {
            kind: request.content_kind,
            input_chars: request.input_chars(),
        });

        let plan = InvocationPlan::for_request(request, &self.settings, events);
        let response = self.runner.invoke(&plan, cancel, events).await?;

        debug!("Analyzer response length: {} chars", response.stdout.len());

        let record = extract(&response.stdout, request);
        events.record(PipelineEvent::Extracted {
            analysis_kind: record.analysis_kind,
            matched: record.matched_fields(),
            declared: record.declared_fields(),
        });

        info!(
            "Extraction complete: {}/{} fields matched",
            record.matched_fields(),
            record.declared_fields()
        );

        let export = if self.config.export_enabled {
            Some(self.export(&record, events))
        } else {
            debug!("Export disabled, skipping");
            None
        };

        Ok(AnalysisOutcome {
            record,
            response,
            plan,
            export,
        })
    }

    fn export(
        &self,
        record: &AnalysisRecord,
        events: &dyn EventSink,
    ) -> Result<ExportReceipt, String> {
        match self.sink.export(record) {
            Ok(receipt) => {
                events.record(PipelineEvent::Exported {
                    path: receipt.path.clone(),
                    bytes: receipt.bytes_written,
                    header_written: receipt.header_written,
                });
                Ok(receipt)
            }
            Err(e) => {
                let path = self.sink.destination(record);
                let message = e.to_string();
                warn!("Export to {} failed: {}", path.display(), message);
                events.record(PipelineEvent::ExportFailed {
                    path,
                    message: message.clone(),
                });
                Err(message)
            }
        }
    }
}
