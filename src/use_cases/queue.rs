//! Interface to the message queue holding "analysis complete" events.
//!
//! The operation set is the minimum an at-least-once consumer needs: batch
//! receive, per-message delete and per-message visibility extension. The actual
//! transport (spool directory, remote queue) is an implementation detail.
use crate::entities::envelope::ReceiptHandle;
use crate::result::QueueErr;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

pub type MessageQueue = Arc<dyn Queue>;

/// At-least-once message queue.
pub trait Queue: Send + Sync + Debug {
    /// Receives up to `max` messages, waiting up to `wait` for the first one.
    ///
    /// An empty batch is a normal outcome, not an error. Received messages stay
    /// invisible to other receivers until deleted or until their visibility
    /// window expires, after which they redeliver.
    fn receive(&self, max: usize, wait: Duration) -> Result<Vec<QueueMessage>, QueueErr>;

    /// Acknowledges one message. The message is never delivered again.
    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueErr>;

    /// Pushes one message's visibility deadline `timeout` into the future.
    fn extend_visibility(&self, receipt: &ReceiptHandle, timeout: Duration)
        -> Result<(), QueueErr>;
}

/// Raw received message, body not yet decoded.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub body: String,
    pub receipt: ReceiptHandle,
    pub receive_count: u32,
}
