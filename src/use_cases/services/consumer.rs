//! The long-running poll/ack/release driver.
//!
//! Per message the loop walks: Received -> Processing -> (Delivering ->)
//! Acknowledged, or -> Released. Acknowledged messages are deleted and never
//! reprocessed. Released messages stay in the queue with their visibility
//! pushed out to a backoff window, so the next receive retries from scratch.
//! Malformed envelopes are the one permanent failure: they are logged and
//! deleted, otherwise a poison message would redeliver forever.
use crate::entities::envelope::{AnalysisEvent, ReceiptHandle};
use crate::result::ConsumerErr;
use crate::use_cases::config::Config;
use crate::use_cases::queue::{MessageQueue, Queue, QueueMessage};
use crate::use_cases::services::processor::{ProcessOutcome, Processor};
use crate::use_cases::sink::{AlertSink, Sink};

use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, trace, warn};

/// Cooperative shutdown flag shared between the loop and its owner.
///
/// Tripping it stops polling for new batches; in-flight messages finish their
/// attempt and anything unacknowledged redelivers naturally.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSwitch(Arc<AtomicBool>);

impl ShutdownSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trip(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Polling parameters, lifted out of [`Config`].
#[derive(Debug, Clone)]
pub struct PollOpts {
    pub batch_size: usize,
    pub wait_time: Duration,
    pub visibility_timeout: Duration,
    pub min_poll_interval: Duration,
    pub pool_size: usize,
}

impl From<&Config> for PollOpts {
    fn from(cfg: &Config) -> Self {
        Self {
            batch_size: cfg.batch_size,
            wait_time: cfg.wait_time(),
            visibility_timeout: cfg.visibility_timeout(),
            min_poll_interval: cfg.min_poll_interval(),
            pool_size: cfg.pool_size,
        }
    }
}

/// Pulls batches from the queue, dispatches entries to the [`Processor`] and
/// settles each message independently.
#[derive(Debug)]
pub struct ConsumerLoop {
    queue: MessageQueue,
    processor: Processor,
    sink: Sink,
    opts: PollOpts,
    shutdown: ShutdownSwitch,
}

impl ConsumerLoop {
    pub fn new(queue: MessageQueue, processor: Processor, sink: Sink, opts: PollOpts) -> Self {
        Self {
            queue,
            processor,
            sink,
            opts,
            shutdown: ShutdownSwitch::new(),
        }
    }

    pub fn shutdown_switch(&self) -> ShutdownSwitch {
        self.shutdown.clone()
    }

    /// Runs until the shutdown switch trips. Blocks the calling thread.
    #[instrument(skip(self))]
    pub fn run(&self) -> Result<(), ConsumerErr> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.opts.pool_size)
            .build()?;
        info!("consumer loop started");
        while !self.shutdown.is_tripped() {
            let poll_started = Instant::now();
            let batch = match self.queue.receive(self.opts.batch_size, self.opts.wait_time) {
                Ok(batch) => batch,
                Err(e) => {
                    error!("receive failed: '{}'", e);
                    Vec::new()
                }
            };
            if batch.is_empty() {
                // empty polls are a normal, silent outcome
                trace!("empty poll");
            } else {
                pool.scope(|scope| {
                    for message in batch {
                        scope.spawn(move |_| self.handle(message));
                    }
                });
            }
            self.pace(poll_started);
        }
        info!("consumer loop stopped");
        Ok(())
    }

    /// One message, one attempt. Never propagates a per-message failure.
    fn handle(&self, message: QueueMessage) {
        // push the deadline out right away so a slow attempt isn't snatched
        // back mid-flight; a failed extension is tolerable, the attempt just
        // races the original window
        if let Err(e) = self
            .queue
            .extend_visibility(&message.receipt, self.opts.visibility_timeout)
        {
            warn!("failed to extend visibility: '{}'", e);
        }

        let event = match AnalysisEvent::from_json(&message.body) {
            Ok(event) => event,
            Err(e) => {
                error!(
                    "malformed envelope (attempt {}), dropping: '{}'",
                    message.receive_count, e
                );
                self.acknowledge(&message.receipt);
                return;
            }
        };

        let run_id = event.run_id.clone();
        debug!(
            "processing run_id={} source={} attempt={}",
            run_id, event.source, message.receive_count
        );
        match self.processor.process(&event) {
            ProcessOutcome::Alert(alert) => match self.sink.emit(&alert) {
                Ok(()) => {
                    info!(
                        "alert emitted for run_id={}: {} keyword(s)",
                        run_id,
                        alert.keywords.len()
                    );
                    self.acknowledge(&message.receipt);
                }
                Err(e) => {
                    warn!(
                        "alert delivery failed for run_id={}, releasing for retry: '{}'",
                        run_id, e
                    );
                    self.release(&run_id);
                }
            },
            ProcessOutcome::NoMatch => {
                debug!("no keyword matches for run_id={}", run_id);
                self.acknowledge(&message.receipt);
            }
            ProcessOutcome::FetchFailure => {
                warn!("documents unfetchable for run_id={}, releasing for retry", run_id);
                self.release(&run_id);
            }
        }
    }

    fn acknowledge(&self, receipt: &ReceiptHandle) {
        if let Err(e) = self.queue.delete(receipt) {
            // the message will redeliver; processing is idempotent so this is
            // duplicate work, not corruption
            error!("failed to delete message: '{}'", e);
        }
    }

    fn release(&self, run_id: &str) {
        // nothing to do on the queue: the message stays undeleted and its
        // visibility was already pushed out to the backoff window
        info!("released run_id={} for redelivery", run_id);
    }

    fn pace(&self, poll_started: Instant) {
        let elapsed = poll_started.elapsed();
        if elapsed < self.opts.min_poll_interval && !self.shutdown.is_tripped() {
            thread::sleep(self.opts.min_poll_interval - elapsed);
        }
    }
}
