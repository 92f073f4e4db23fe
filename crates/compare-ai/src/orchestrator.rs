//! AI comparison orchestrator
//!
//! Drives one request at a time through `IDLE → LOADING → ANALYZING|TAGGING
//! → COMPLETED` (or `ERROR`). State lives in a `watch` channel: the
//! orchestrator is its only writer and any number of observers can
//! subscribe.
//!
//! A new request cancels the one in flight. The old task is aborted and its
//! generation retired, so even a write racing the abort is discarded. The
//! new request starts from a fresh `IDLE` record, carrying over the results
//! of the other stage when it runs on the same diff.

use crate::backend::{AiBackend, AnalyzeRequest, TagRequest};
use crate::error::AiError;
use crate::payload::{change_payloads, correlate_tags, transform_changes};
use compare_types::{
    AiComparisonData, AiComparisonOptions, AiComparisonPhase, AiOperationType,
    DocumentComparisonResult,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

struct Inflight {
    handle: Option<JoinHandle<()>>,
    diff: Option<Arc<DocumentComparisonResult>>,
}

pub struct AiOrchestrator {
    backend: Arc<dyn AiBackend>,
    state: Arc<watch::Sender<AiComparisonData>>,
    generation: Arc<AtomicU64>,
    inflight: Mutex<Inflight>,
}

/// Writes to the shared record on behalf of one request generation
struct StateWriter {
    state: Arc<watch::Sender<AiComparisonData>>,
    generation: Arc<AtomicU64>,
    mine: u64,
}

impl StateWriter {
    /// Apply `f` unless this request was superseded. Returns whether it applied.
    fn update(&self, f: impl FnOnce(&mut AiComparisonData) -> bool) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|data| {
            if self.generation.load(Ordering::SeqCst) != self.mine {
                return false;
            }
            applied = f(data);
            applied
        });
        applied
    }

    fn advance(&self, phase: AiComparisonPhase) -> bool {
        self.update(|data| data.advance(phase))
    }
}

impl AiOrchestrator {
    pub fn new(backend: Arc<dyn AiBackend>) -> Self {
        let (state, _) = watch::channel(AiComparisonData::idle());
        Self {
            backend,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            inflight: Mutex::new(Inflight {
                handle: None,
                diff: None,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AiComparisonData> {
        self.state.subscribe()
    }

    /// Current state of the latest request
    pub fn snapshot(&self) -> AiComparisonData {
        self.state.borrow().clone()
    }

    fn inflight(&self) -> MutexGuard<'_, Inflight> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Abort the request in flight, if any
    ///
    /// A request that had not finished ends in the `Error` phase. Without a
    /// request the record is left as it is.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let Some(handle) = self.inflight().handle.take() else {
            return;
        };
        handle.abort();
        if self
            .state
            .send_if_modified(|data| data.fail("AI comparison cancelled", None))
        {
            debug!("Cancelled AI comparison");
        }
    }

    /// Start a request on `diff`, cancelling any request in flight
    ///
    /// Returns the generation of the new request.
    pub fn start(&self, diff: Arc<DocumentComparisonResult>, options: AiComparisonOptions) -> u64 {
        let mut inflight = self.inflight();
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(handle) = inflight.handle.take() {
            handle.abort();
            debug!(generation = mine, "Superseding AI comparison in flight");
        }

        let same_diff = inflight
            .diff
            .as_ref()
            .is_some_and(|previous| Arc::ptr_eq(previous, &diff) || **previous == *diff);
        let fresh = if same_diff {
            carry_over(&self.state.borrow(), options.operation_type)
        } else {
            AiComparisonData::idle()
        };
        self.state.send_replace(fresh);

        let writer = StateWriter {
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
            mine,
        };
        let task = tokio::spawn(run_request(
            Arc::clone(&self.backend),
            writer,
            Arc::clone(&diff),
            options,
        ));
        inflight.diff = Some(diff);
        inflight.handle = Some(task);
        mine
    }

    /// Run a request to completion and return the final record
    ///
    /// Fails with [`AiError::Cancelled`] if a newer request superseded this
    /// one. Service failures are not errors here: they end in the `Error`
    /// phase with the diff untouched.
    #[instrument(skip_all, fields(operation = ?options.operation_type))]
    pub async fn run(
        &self,
        diff: Arc<DocumentComparisonResult>,
        options: AiComparisonOptions,
    ) -> Result<AiComparisonData, AiError> {
        let mut receiver = self.subscribe();
        let mine = self.start(diff, options);

        loop {
            if self.generation.load(Ordering::SeqCst) != mine {
                return Err(AiError::Cancelled);
            }
            {
                let data = receiver.borrow_and_update();
                if data.phase.is_terminal() {
                    return Ok(data.clone());
                }
            }
            if receiver.changed().await.is_err() {
                return Err(AiError::Cancelled);
            }
        }
    }
}

/// Fresh record that keeps the completed results of the other stage
fn carry_over(previous: &AiComparisonData, operation: AiOperationType) -> AiComparisonData {
    let mut fresh = AiComparisonData::idle();
    match operation {
        AiOperationType::Tag => {
            fresh.summary = previous.summary.clone();
            fresh.categories = previous.categories.clone();
        }
        AiOperationType::Analyze => {
            fresh.tagged_changes = previous.tagged_changes.clone();
            fresh.ai_enhanced_changes = previous.ai_enhanced_changes.clone();
        }
    }
    fresh
}

async fn run_request(
    backend: Arc<dyn AiBackend>,
    writer: StateWriter,
    diff: Arc<DocumentComparisonResult>,
    options: AiComparisonOptions,
) {
    let changes = change_payloads(&diff, options.text_options.context_words());
    let sent = transform_changes(&changes);
    debug!(changes = changes.len(), sent = sent.len(), "Prepared AI payloads");

    let loaded = writer.update(|data| {
        if !data.advance(AiComparisonPhase::Loading) {
            return false;
        }
        data.changes = changes;
        data.transformed_changes = Some(sent.clone());
        true
    });
    if !loaded {
        return;
    }

    match options.operation_type {
        AiOperationType::Analyze => {
            if !writer.advance(AiComparisonPhase::Analyzing) {
                return;
            }
            let result = backend.analyze(&AnalyzeRequest { changes: sent }).await;
            writer.update(|data| match result {
                Ok(analysis) => {
                    info!(categories = analysis.categories.len(), "AI analysis complete");
                    data.summary = Some(analysis.summary);
                    data.categories = analysis.categories;
                    data.advance(AiComparisonPhase::Completed)
                }
                Err(err) => {
                    warn!(error = %err, "AI analysis failed");
                    data.clear_analysis();
                    data.fail(err.to_string(), err.details())
                }
            });
        }
        AiOperationType::Tag => {
            if !writer.advance(AiComparisonPhase::Tagging) {
                return;
            }
            let request = TagRequest {
                changes: sent.clone(),
                categories: options.categories.clone().unwrap_or_default(),
            };
            let result = backend.tag(&request).await;
            writer.update(|data| match result {
                Ok(tags) => {
                    let (kept, enhanced) = correlate_tags(&sent, tags);
                    info!(tagged = kept.len(), "AI tagging complete");
                    data.tagged_changes = Some(kept);
                    data.ai_enhanced_changes = Some(enhanced);
                    data.advance(AiComparisonPhase::Completed)
                }
                Err(err) => {
                    warn!(error = %err, "AI tagging failed");
                    data.clear_tags();
                    data.fail(err.to_string(), err.details())
                }
            });
        }
    }
}
