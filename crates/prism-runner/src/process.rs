//! Process-backed invoker
//!
//! Spawns the analyzer once per call. Output is read incrementally by
//! background tasks into shared buffers, so whatever the process wrote
//! before a timeout or cancellation is still available as a partial
//! response. No state is shared between calls.

use crate::cancel::CancelToken;
use crate::plan::{InputDelivery, InvocationPlan};
use crate::{InvokeError, Invoker, RawResponse};
use prism_domain::{EventSink, KillReason, PipelineEvent};
use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long to wait for a killed process to be reaped
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to keep draining pipes after the process exits
///
/// Background children the analyzer started may inherit its pipes and keep
/// them open; output still unread after this grace period is dropped.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Read buffer size for stdout/stderr
const READ_CHUNK: usize = 8 * 1024;

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Invoker that runs the analyzer as a child process
///
/// # Examples
///
/// ```no_run
/// use prism_runner::{CancelToken, InvocationPlan, Invoker, ProcessRunner};
/// use prism_domain::NullSink;
///
/// # async fn example() -> Result<(), prism_runner::InvokeError> {
/// let plan = InvocationPlan::new("fabric", vec!["--pattern".into(), "rate_content".into()])
///     .with_stdin("Some article text");
/// let response = ProcessRunner::new()
///     .invoke(&plan, CancelToken::never(), &NullSink)
///     .await?;
/// println!("{}", response.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner
    pub fn new() -> Self {
        Self
    }
}

enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    Killed(KillReason),
}

impl Invoker for ProcessRunner {
    async fn invoke(
        &self,
        plan: &InvocationPlan,
        mut cancel: CancelToken,
        events: &dyn EventSink,
    ) -> Result<RawResponse, InvokeError> {
        let program = plan.program.display().to_string();

        if cancel.is_cancelled() {
            info!("Invocation of {} cancelled before spawn", program);
            return Err(InvokeError::Cancelled {
                elapsed_ms: 0,
                partial: RawResponse::default(),
            });
        }

        let mut command = Command::new(&plan.program);
        command
            .args(&plan.args)
            .envs(&plan.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        match plan.input {
            InputDelivery::Stdin(_) => command.stdin(Stdio::piped()),
            InputDelivery::Argument => command.stdin(Stdio::null()),
        };

        let start = Instant::now();
        let mut child = command.spawn().map_err(|e| InvokeError::Spawn {
            program: program.clone(),
            message: spawn_message(&e),
        })?;

        info!("Spawned {} (pid {:?})", program, child.id());
        events.record(PipelineEvent::Spawned {
            program: program.clone(),
            args: plan.args.clone(),
            via_stdin: plan.uses_stdin(),
        });

        let stdout_buf = SharedBuffer::default();
        let stderr_buf = SharedBuffer::default();
        let mut stdout_task = spawn_reader(child.stdout.take(), Arc::clone(&stdout_buf));
        let mut stderr_task = spawn_reader(child.stderr.take(), Arc::clone(&stderr_buf));
        let stdin_task = match (&plan.input, child.stdin.take()) {
            (InputDelivery::Stdin(payload), Some(stdin)) => Some(spawn_writer(stdin, payload.clone())),
            _ => None,
        };

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            _ = tokio::time::sleep(plan.timeout) => Outcome::Killed(KillReason::Timeout),
            _ = cancel.cancelled() => Outcome::Killed(KillReason::Cancelled),
        };

        if let Some(task) = stdin_task {
            task.abort();
        }

        match outcome {
            Outcome::Exited(status) => {
                let duration_ms = elapsed_ms(start);
                let drained = tokio::time::timeout(DRAIN_GRACE, async {
                    let _ = (&mut stdout_task).await;
                    let _ = (&mut stderr_task).await;
                })
                .await;
                if drained.is_err() {
                    debug!(
                        "Output pipes of {} still open {:?} after exit, keeping what was read",
                        program, DRAIN_GRACE
                    );
                    stdout_task.abort();
                    stderr_task.abort();
                }

                let response = RawResponse {
                    stdout: snapshot(&stdout_buf),
                    stderr: snapshot(&stderr_buf),
                    exit_code: status.as_ref().ok().and_then(ExitStatus::code),
                    duration_ms,
                };

                if let Err(e) = status {
                    warn!("Failed to wait for {}: {}", program, e);
                    return Err(InvokeError::NonZeroExit {
                        exit_code: None,
                        diagnostic: format!("failed to wait for analyzer: {}", e),
                        response,
                    });
                }

                debug!(
                    "{} exited with {:?} after {} ms",
                    program, response.exit_code, duration_ms
                );
                events.record(PipelineEvent::Exited {
                    exit_code: response.exit_code,
                    duration_ms,
                    stdout_bytes: response.stdout.len(),
                    stderr_bytes: response.stderr.len(),
                });

                response.into_result()
            }
            Outcome::Killed(reason) => {
                // Stop consuming output before the process goes away.
                stdout_task.abort();
                stderr_task.abort();

                if let Err(e) = child.start_kill() {
                    debug!("Kill of {} failed (already exited?): {}", program, e);
                }
                if tokio::time::timeout(REAP_TIMEOUT, child.wait()).await.is_err() {
                    warn!("{} did not exit within {:?} of being killed", program, REAP_TIMEOUT);
                }

                let after_ms = elapsed_ms(start);
                warn!("{} killed ({}) after {} ms", program, reason.as_str(), after_ms);
                events.record(PipelineEvent::Killed { reason, after_ms });

                let partial = RawResponse {
                    stdout: snapshot(&stdout_buf),
                    stderr: snapshot(&stderr_buf),
                    exit_code: None,
                    duration_ms: after_ms,
                };

                Err(match reason {
                    KillReason::Timeout => InvokeError::Timeout {
                        timeout_ms: plan.timeout.as_millis() as u64,
                        partial,
                    },
                    KillReason::Cancelled => InvokeError::Cancelled {
                        elapsed_ms: after_ms,
                        partial,
                    },
                })
            }
        }
    }
}

fn spawn_reader<R>(stream: Option<R>, buffer: SharedBuffer) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut stream) = stream else {
            return;
        };
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => buffer
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!("Output stream closed with error: {}", e);
                    break;
                }
            }
        }
    })
}

fn spawn_writer(mut stdin: ChildStdin, payload: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = stdin.write_all(payload.as_bytes()).await {
            // The analyzer may exit without reading all of its input.
            debug!("Stdin write ended early: {}", e);
        }
        // Dropping stdin closes the pipe so the analyzer sees EOF.
    })
}

fn snapshot(buffer: &SharedBuffer) -> String {
    let bytes = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn spawn_message(e: &std::io::Error) -> String {
    match e.kind() {
        ErrorKind::NotFound => {
            "executable not found on PATH or the configured search paths; install it or set `executable` in the config".to_string()
        }
        ErrorKind::PermissionDenied => "executable is not runnable (permission denied)".to_string(),
        _ => e.to_string(),
    }
}
