//! Interface for delivering alerts.
use crate::entities::alert::AlertRecord;
use crate::result::SinkErr;

use std::fmt::Debug;
use std::sync::Arc;

pub type Sink = Arc<dyn AlertSink>;

/// Delivers a fully-formed alert (console, email, webhook).
///
/// The contract is fire-and-forget with an outcome: a failed emit leaves the
/// message unacknowledged so delivery is retried on redelivery. Implementations
/// that need exactly-once behavior must dedupe on the alert's run id.
pub trait AlertSink: Send + Sync + Debug {
    fn emit(&self, alert: &AlertRecord) -> Result<(), SinkErr>;
}
