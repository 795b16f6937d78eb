use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::time::{Duration, Instant};

/// One remote call, from dispatch to completion, as handed to an [`Observer`].
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub operation: &'static str,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub input_chars: usize,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub error: Option<String>,
}

/// Explicit instrumentation handle opened by the orchestrator around each
/// remote call. Closing it (`finish`/`fail`) yields the record to report.
pub struct CallSpan {
    operation: &'static str,
    model: String,
    input_chars: usize,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl CallSpan {
    pub fn begin(operation: &'static str, model: &str, input_chars: usize) -> Self {
        CallSpan {
            operation,
            model: model.to_owned(),
            input_chars,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn finish(self, prompt_tokens: u32, completion_tokens: u32) -> CallRecord {
        self.into_record(prompt_tokens, completion_tokens, None)
    }

    pub fn fail(self, error: impl Display) -> CallRecord {
        self.into_record(0, 0, Some(error.to_string()))
    }

    fn into_record(
        self,
        prompt_tokens: u32,
        completion_tokens: u32,
        error: Option<String>,
    ) -> CallRecord {
        CallRecord {
            operation: self.operation,
            model: self.model,
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
            input_chars: self.input_chars,
            prompt_tokens,
            completion_tokens,
            error,
        }
    }
}

/// Sink for call records. Injected into the orchestrator so the core stays
/// importable and testable without any tracing backend.
pub trait Observer {
    fn record(&self, record: CallRecord);
}

/// Default observer: discards everything.
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record(&self, _record: CallRecord) {}
}

/// Reports call records as `tracing` events.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn record(&self, record: CallRecord) {
        let elapsed_ms = record.elapsed.as_millis() as u64;
        match &record.error {
            None => tracing::info!(
                operation = record.operation,
                model = %record.model,
                started_at = %record.started_at,
                elapsed_ms,
                input_chars = record.input_chars,
                prompt_tokens = record.prompt_tokens,
                completion_tokens = record.completion_tokens,
                "llm call completed"
            ),
            Some(error) => tracing::warn!(
                operation = record.operation,
                model = %record.model,
                started_at = %record.started_at,
                elapsed_ms,
                input_chars = record.input_chars,
                error = %error,
                "llm call failed"
            ),
        }
    }
}
