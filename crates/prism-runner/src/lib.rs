//! Prism Runner
//!
//! Runs the external analyzer for one request: builds an invocation plan,
//! spawns the process, streams its input and output, and enforces the
//! timeout and cancellation contract.
//!
//! # Invokers
//!
//! - `ProcessRunner`: spawns the real analyzer executable
//! - `MockRunner`: deterministic canned responses for testing
//!
//! # Exit contract
//!
//! An invocation succeeds only when the process exits with code 0 *and*
//! writes non-blank standard output. Standard error is diagnostic only; it
//! is never treated as the analysis result.
//!
//! # Examples
//!
//! ```
//! use prism_runner::{CancelToken, InvocationPlan, Invoker, MockRunner};
//! use prism_domain::NullSink;
//!
//! # tokio_test_block_on(async {
//! let runner = MockRunner::new("Clarity: 8/10");
//! let plan = InvocationPlan::new("fabric", vec![]).with_stdin("text");
//! let response = runner.invoke(&plan, CancelToken::never(), &NullSink).await.unwrap();
//! assert_eq!(response.stdout, "Clarity: 8/10");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod cancel;
pub mod plan;
pub mod process;

use prism_domain::{EventSink, KillReason, PipelineEvent};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use plan::{
    search_path_overlay, truncate_payload, InputDelivery, InvocationPlan, RunnerSettings,
    DEFAULT_EXECUTABLE, DEFAULT_SEARCH_PATHS, TRUNCATION_MARKER,
};
pub use process::ProcessRunner;

/// Captured result of one analyzer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Standard output (lossy UTF-8)
    pub stdout: String,

    /// Standard error (lossy UTF-8)
    pub stderr: String,

    /// Exit code; `None` if killed or terminated by a signal
    pub exit_code: Option<i32>,

    /// Wall time from spawn to exit or kill
    pub duration_ms: u64,
}

impl RawResponse {
    /// Diagnostic text for error reporting
    ///
    /// Trimmed stderr, or a synthesized message when stderr is empty.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.exit_code {
            Some(0) => "analyzer exited successfully but wrote nothing to stdout or stderr".to_string(),
            Some(code) => format!("analyzer exited with status {} and wrote nothing to stderr", code),
            None => "analyzer was terminated and wrote nothing to stderr".to_string(),
        }
    }

    /// Apply the exit contract
    pub fn into_result(self) -> Result<RawResponse, InvokeError> {
        if self.exit_code != Some(0) {
            return Err(InvokeError::NonZeroExit {
                exit_code: self.exit_code,
                diagnostic: self.diagnostic(),
                response: self,
            });
        }
        if self.stdout.trim().is_empty() {
            return Err(InvokeError::EmptyOutput {
                diagnostic: self.diagnostic(),
                response: self,
            });
        }
        Ok(self)
    }
}

/// Errors that terminate an invocation
///
/// None of these are retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// Executable missing or not runnable
    #[error("Could not start analyzer `{program}`: {message}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// What went wrong
        message: String,
    },

    /// Timeout elapsed; the process was killed
    #[error(
        "Analyzer timed out after {timeout_ms} ms; the input may be too large or the remote resource too slow to respond"
    )]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
        /// Output captured before the kill
        partial: RawResponse,
    },

    /// Caller cancelled; the process was killed
    #[error("Analysis cancelled after {elapsed_ms} ms")]
    Cancelled {
        /// Time since spawn
        elapsed_ms: u64,
        /// Output captured before the kill
        partial: RawResponse,
    },

    /// Process ran but failed
    #[error("Analyzer failed ({}): {diagnostic}", describe_exit(.exit_code))]
    NonZeroExit {
        /// Exit code, if any
        exit_code: Option<i32>,
        /// Stderr or synthesized message
        diagnostic: String,
        /// Full captured response
        response: RawResponse,
    },

    /// Process exited 0 but wrote nothing usable
    #[error("Analyzer produced no output: {diagnostic}")]
    EmptyOutput {
        /// Stderr or synthesized message
        diagnostic: String,
        /// Full captured response
        response: RawResponse,
    },
}

impl InvokeError {
    /// Output captured before the failure, if the process ran at all
    pub fn partial_response(&self) -> Option<&RawResponse> {
        match self {
            InvokeError::Spawn { .. } => None,
            InvokeError::Timeout { partial, .. } | InvokeError::Cancelled { partial, .. } => {
                Some(partial)
            }
            InvokeError::NonZeroExit { response, .. } | InvokeError::EmptyOutput { response, .. } => {
                Some(response)
            }
        }
    }

    /// Short machine-friendly name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::Spawn { .. } => "spawn_error",
            InvokeError::Timeout { .. } => "timeout",
            InvokeError::Cancelled { .. } => "cancelled",
            InvokeError::NonZeroExit { .. } => "non_zero_exit",
            InvokeError::EmptyOutput { .. } => "empty_output",
        }
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

/// Runs one invocation plan to completion
///
/// Each call owns its own process and timer; implementations must not share
/// mutable state between calls.
pub trait Invoker: Send + Sync {
    /// Run `plan`, honoring its timeout and the cancel token
    fn invoke(
        &self,
        plan: &InvocationPlan,
        cancel: CancelToken,
        events: &dyn EventSink,
    ) -> impl Future<Output = Result<RawResponse, InvokeError>> + Send;
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Output { stdout: String, stderr: String, exit_code: i32 },
    Error(InvokeError),
}

/// Mock invoker for deterministic testing
///
/// Returns a pre-configured response without spawning anything, records
/// every plan it receives, and still honors the plan timeout and the
/// cancel token when configured with a delay.
///
/// # Examples
///
/// ```
/// use prism_runner::MockRunner;
///
/// let runner = MockRunner::new("Overall: 9/10");
/// assert_eq!(runner.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockRunner {
    outcome: MockOutcome,
    delay: Duration,
    plans: Arc<Mutex<Vec<InvocationPlan>>>,
}

impl MockRunner {
    /// Succeed with `stdout` and exit code 0
    pub fn new(stdout: impl Into<String>) -> Self {
        Self::with_exit(stdout, "", 0)
    }

    /// Complete with explicit output and exit code; the exit contract applies
    pub fn with_exit(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            outcome: MockOutcome::Output {
                stdout: stdout.into(),
                stderr: stderr.into(),
                exit_code,
            },
            delay: Duration::ZERO,
            plans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every call with `error`
    pub fn failing(error: InvokeError) -> Self {
        Self {
            outcome: MockOutcome::Error(error),
            delay: Duration::ZERO,
            plans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pretend the analyzer takes `delay` to answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of invocations so far
    pub fn call_count(&self) -> usize {
        self.plans().len()
    }

    /// Plans received so far, in call order
    pub fn plans(&self) -> Vec<InvocationPlan> {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl Invoker for MockRunner {
    async fn invoke(
        &self,
        plan: &InvocationPlan,
        mut cancel: CancelToken,
        events: &dyn EventSink,
    ) -> Result<RawResponse, InvokeError> {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(plan.clone());

        if cancel.is_cancelled() {
            return Err(InvokeError::Cancelled {
                elapsed_ms: 0,
                partial: RawResponse::default(),
            });
        }

        let (stdout, stderr, exit_code) = match &self.outcome {
            MockOutcome::Error(e) => return Err(e.clone()),
            MockOutcome::Output { stdout, stderr, exit_code } => (stdout, stderr, *exit_code),
        };

        events.record(PipelineEvent::Spawned {
            program: plan.program.display().to_string(),
            args: plan.args.clone(),
            via_stdin: plan.uses_stdin(),
        });

        let start = tokio::time::Instant::now();
        let killed = tokio::select! {
            _ = tokio::time::sleep(self.delay) => None,
            _ = tokio::time::sleep(plan.timeout) => Some(KillReason::Timeout),
            _ = cancel.cancelled() => Some(KillReason::Cancelled),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match killed {
            Some(reason) => {
                events.record(PipelineEvent::Killed { reason, after_ms: elapsed_ms });
                let partial = RawResponse { duration_ms: elapsed_ms, ..RawResponse::default() };
                Err(match reason {
                    KillReason::Timeout => InvokeError::Timeout {
                        timeout_ms: plan.timeout.as_millis() as u64,
                        partial,
                    },
                    KillReason::Cancelled => InvokeError::Cancelled { elapsed_ms, partial },
                })
            }
            None => {
                let response = RawResponse {
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                    exit_code: Some(exit_code),
                    duration_ms: elapsed_ms,
                };
                events.record(PipelineEvent::Exited {
                    exit_code: response.exit_code,
                    duration_ms: elapsed_ms,
                    stdout_bytes: response.stdout.len(),
                    stderr_bytes: response.stderr.len(),
                });
                response.into_result()
            }
        }
    }
}
