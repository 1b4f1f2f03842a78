//! Test doubles shared across unit tests: a recording queue, an in-memory
//! fetcher and a recording alert sink.
use crate::entities::alert::AlertRecord;
use crate::entities::document::DocumentRef;
use crate::entities::envelope::ReceiptHandle;
use crate::result::{QueueErr, SinkErr};
use crate::use_cases::fetcher::{DocumentFetcher, FetchResult};
use crate::use_cases::queue::{Queue, QueueMessage};
use crate::use_cases::sink::AlertSink;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn test_queue() -> Arc<TestQueue> {
    Arc::new(TestQueue::default())
}

/// In-memory queue recording deletes and visibility extensions.
///
/// Messages are delivered once; "release" behavior is observed as the absence
/// of a delete, redelivery itself is covered by the spool queue tests.
#[derive(Debug, Default)]
pub struct TestQueue {
    pending: Mutex<VecDeque<String>>,
    issued: Mutex<HashMap<ReceiptHandle, String>>,
    deleted: Mutex<Vec<String>>,
    extended: Mutex<Vec<ReceiptHandle>>,
    fail_receive: Mutex<Option<QueueErr>>,
    receipt_counter: AtomicU32,
}

impl TestQueue {
    pub fn push(&self, body: String) {
        self.pending.lock().expect("poisoned mutex").push_back(body);
    }

    pub fn fail_next_receive(&self, err: QueueErr) {
        *self.fail_receive.lock().expect("poisoned mutex") = Some(err);
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.lock().expect("poisoned mutex").len()
    }

    pub fn eventually_deleted(&self, needle: &str, timeout: Duration) -> bool {
        eventually(timeout, || {
            self.deleted
                .lock()
                .expect("poisoned mutex")
                .iter()
                .any(|body| body.contains(needle))
        })
    }

    pub fn eventually_deleted_any(&self, timeout: Duration) -> bool {
        eventually(timeout, || self.deleted_count() > 0)
    }

    pub fn wait_for_deleted_count(&self, count: usize, timeout: Duration) -> bool {
        eventually(timeout, || self.deleted_count() >= count)
    }

    pub fn eventually_extended(&self, timeout: Duration) -> bool {
        eventually(timeout, || {
            !self.extended.lock().expect("poisoned mutex").is_empty()
        })
    }
}

impl Queue for TestQueue {
    fn receive(&self, max: usize, _wait: Duration) -> Result<Vec<QueueMessage>, QueueErr> {
        if let Some(err) = self.fail_receive.lock().expect("poisoned mutex").take() {
            return Err(err);
        }
        let mut pending = self.pending.lock().expect("poisoned mutex");
        let mut issued = self.issued.lock().expect("poisoned mutex");
        let mut batch = Vec::new();
        while batch.len() < max {
            let Some(body) = pending.pop_front() else { break };
            let receipt = ReceiptHandle(format!(
                "r-{}",
                self.receipt_counter.fetch_add(1, Ordering::SeqCst)
            ));
            issued.insert(receipt.clone(), body.clone());
            batch.push(QueueMessage {
                body,
                receipt,
                receive_count: 1,
            });
        }
        Ok(batch)
    }

    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueErr> {
        let body = self
            .issued
            .lock()
            .expect("poisoned mutex")
            .remove(receipt)
            .ok_or_else(|| QueueErr::UnknownReceipt(receipt.to_string()))?;
        self.deleted.lock().expect("poisoned mutex").push(body);
        Ok(())
    }

    fn extend_visibility(
        &self,
        receipt: &ReceiptHandle,
        _timeout: Duration,
    ) -> Result<(), QueueErr> {
        self.extended
            .lock()
            .expect("poisoned mutex")
            .push(receipt.clone());
        Ok(())
    }
}

/// Fetcher serving documents from a uri -> text map; everything else is NotFound.
#[derive(Debug)]
pub struct MapFetcher {
    docs: HashMap<String, String>,
}

impl MapFetcher {
    pub fn with_docs(docs: &[(&str, &str)]) -> Self {
        Self {
            docs: docs
                .iter()
                .map(|(uri, text)| (uri.to_string(), text.to_string()))
                .collect(),
        }
    }
}

impl DocumentFetcher for MapFetcher {
    fn fetch(&self, doc: &DocumentRef) -> FetchResult {
        match self.docs.get(&doc.uri) {
            Some(text) => FetchResult::Content(text.clone()),
            None => FetchResult::NotFound,
        }
    }
}

/// Sink recording emit attempts and delivered alerts.
#[derive(Debug)]
pub struct RecordingSink {
    attempts_tx: Mutex<Sender<()>>,
    attempts_rx: Mutex<Receiver<()>>,
    alerts_tx: Mutex<Sender<AlertRecord>>,
    alerts_rx: Mutex<Receiver<AlertRecord>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::create(false)
    }

    pub fn failing() -> Self {
        Self::create(true)
    }

    fn create(fail: bool) -> Self {
        let (attempts_tx, attempts_rx) = channel();
        let (alerts_tx, alerts_rx) = channel();
        Self {
            attempts_tx: Mutex::new(attempts_tx),
            attempts_rx: Mutex::new(attempts_rx),
            alerts_tx: Mutex::new(alerts_tx),
            alerts_rx: Mutex::new(alerts_rx),
            fail,
        }
    }

    pub fn next_alert(&self, timeout: Duration) -> Option<AlertRecord> {
        self.alerts_rx
            .lock()
            .expect("poisoned mutex")
            .recv_timeout(timeout)
            .ok()
    }

    pub fn emit_attempted(&self, timeout: Duration) -> bool {
        self.attempts_rx
            .lock()
            .expect("poisoned mutex")
            .recv_timeout(timeout)
            .is_ok()
    }
}

impl AlertSink for RecordingSink {
    fn emit(&self, alert: &AlertRecord) -> Result<(), SinkErr> {
        self.attempts_tx
            .lock()
            .expect("poisoned mutex")
            .send(())
            .expect("failed to send message");
        if self.fail {
            return Err(SinkErr::Delivery("recording sink set to fail".into()));
        }
        self.alerts_tx
            .lock()
            .expect("poisoned mutex")
            .send(alert.clone())
            .expect("failed to send message");
        Ok(())
    }
}

fn eventually<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if std::time::Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
