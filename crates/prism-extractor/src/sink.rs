//! Event sink that forwards pipeline events to `tracing`

use prism_domain::{EventSink, PipelineEvent};
use tracing::{info, warn};

/// Forwards every event to the `tracing` subscriber
///
/// Warnings (truncation, kills, export failures) are logged at `warn`,
/// everything else at `info`, under the `prism::pipeline` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: PipelineEvent) {
        let stage = event.stage();
        if event.is_warning() {
            warn!(target: "prism::pipeline", stage, "{}", event);
        } else {
            info!(target: "prism::pipeline", stage, "{}", event);
        }
    }
}

/// Sends each event to two sinks
///
/// Used to keep an in-memory trace while also logging.
#[derive(Debug, Clone, Default)]
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: EventSink, B: EventSink> TeeSink<A, B> {
    /// Combine two sinks
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: EventSink, B: EventSink> EventSink for TeeSink<A, B> {
    fn record(&self, event: PipelineEvent) {
        self.first.record(event.clone());
        self.second.record(event);
    }
}
