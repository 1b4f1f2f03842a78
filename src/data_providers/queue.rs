//! Spool-directory implementation of [`crate::use_cases::queue::Queue`].
//!
//! Each message is one JSON file dropped into the spool directory by the
//! producer. Receiving a file hides it for the visibility window instead of
//! removing it; deleting removes the file; a message whose window expires
//! without a delete simply shows up in a later receive - that is the
//! redelivery mechanism. Visibility bookkeeping is in-memory, so a process
//! restart makes everything visible again, which at-least-once semantics allow.
//!
//! A file younger than the settle window is held back from its first delivery.
//! Producers writing non-atomically would otherwise race the poll: a partial
//! but parseable body would be classed malformed and dropped for good.
use crate::entities::envelope::ReceiptHandle;
use crate::result::QueueErr;
use crate::use_cases::queue::{Queue, QueueMessage};

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_TICK: Duration = Duration::from_millis(50);
const SETTLE_WINDOW: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct SpoolQueue {
    dir: PathBuf,
    visibility: Duration,
    settle: Duration,
    state: Mutex<SpoolState>,
}

#[derive(Debug, Default)]
struct SpoolState {
    invisible_until: HashMap<PathBuf, Instant>,
    receipts: HashMap<ReceiptHandle, PathBuf>,
    receive_counts: HashMap<PathBuf, u32>,
}

impl SpoolQueue {
    /// Opens (and creates if needed) the spool directory. `visibility` is the
    /// window applied on receive.
    pub fn new<P: AsRef<Path>>(dir: P, visibility: Duration) -> Result<Self, QueueErr> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            visibility,
            settle: SETTLE_WINDOW,
            state: Mutex::new(SpoolState::default()),
        })
    }

    /// Overrides how long a fresh file is held back before its first delivery.
    pub fn with_settle_window(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    fn take_ready(&self, max: usize) -> Result<Vec<QueueMessage>, QueueErr> {
        let mut state = self.state.lock().map_err(|_| QueueErr::Poisoned)?;
        let now = Instant::now();
        let mut batch = Vec::new();
        for path in self.spool_files()? {
            if batch.len() >= max {
                break;
            }
            if state
                .invisible_until
                .get(&path)
                .is_some_and(|until| *until > now)
            {
                continue;
            }
            if !state.receive_counts.contains_key(&path) && self.settling(&path) {
                debug!("holding back fresh spool file '{}'", path.display());
                continue;
            }
            let body = match fs::read_to_string(&path) {
                Ok(body) => body,
                Err(e) => {
                    // deleted or mid-write, it will show up in a later poll
                    debug!("skipping unreadable spool file '{}': {}", path.display(), e);
                    continue;
                }
            };
            let receipt = self.mint_receipt(&path);
            state.invisible_until.insert(path.clone(), now + self.visibility);
            state.receipts.retain(|_, p| p != &path); // stale receipts die with redelivery
            state.receipts.insert(receipt.clone(), path.clone());
            let count = state.receive_counts.entry(path).or_insert(0);
            *count += 1;
            batch.push(QueueMessage {
                body,
                receipt,
                receive_count: *count,
            });
        }
        Ok(batch)
    }

    fn spool_files(&self) -> Result<Vec<PathBuf>, QueueErr> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    // unreadable metadata or a future mtime both count as still settling
    fn settling(&self, path: &Path) -> bool {
        if self.settle.is_zero() {
            return false;
        }
        let Ok(modified) = fs::metadata(path).and_then(|meta| meta.modified()) else {
            return true;
        };
        modified.elapsed().map_or(true, |age| age < self.settle)
    }

    fn mint_receipt(&self, path: &Path) -> ReceiptHandle {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        ReceiptHandle(format!("{}#{}", path.display(), token))
    }
}

impl Queue for SpoolQueue {
    fn receive(&self, max: usize, wait: Duration) -> Result<Vec<QueueMessage>, QueueErr> {
        let deadline = Instant::now() + wait;
        loop {
            let batch = self.take_ready(max)?;
            if !batch.is_empty() || Instant::now() >= deadline {
                return Ok(batch);
            }
            thread::sleep(POLL_TICK.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueErr> {
        let mut state = self.state.lock().map_err(|_| QueueErr::Poisoned)?;
        let path = state
            .receipts
            .remove(receipt)
            .ok_or_else(|| QueueErr::UnknownReceipt(receipt.to_string()))?;
        state.invisible_until.remove(&path);
        state.receive_counts.remove(&path);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // already gone counts as deleted
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("spool file already removed: '{}'", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn extend_visibility(
        &self,
        receipt: &ReceiptHandle,
        timeout: Duration,
    ) -> Result<(), QueueErr> {
        let mut state = self.state.lock().map_err(|_| QueueErr::Poisoned)?;
        let path = state
            .receipts
            .get(receipt)
            .cloned()
            .ok_or_else(|| QueueErr::UnknownReceipt(receipt.to_string()))?;
        state
            .invisible_until
            .insert(path, Instant::now() + timeout);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use anyhow::Result;
    use claim::{assert_err, assert_ok};
    use tempfile::tempdir;

    fn drop_message(dir: &Path, name: &str, body: &str) -> Result<()> {
        fs::write(dir.join(name), body)?;
        Ok(())
    }

    // zero settle so tests can receive right after writing
    fn open_queue(dir: &Path, visibility: Duration) -> Result<SpoolQueue> {
        Ok(SpoolQueue::new(dir, visibility)?.with_settle_window(Duration::ZERO))
    }

    #[test]
    fn fresh_file_is_held_back_until_the_settle_window_passes() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = SpoolQueue::new(spool.path(), Duration::from_secs(60))?
            .with_settle_window(Duration::from_millis(100));
        drop_message(spool.path(), "m1.json", "still being written")?;

        // when
        let early = queue.receive(10, Duration::from_millis(10))?;
        let later = queue.receive(10, Duration::from_millis(500))?;

        // then
        assert!(early.is_empty());
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].body, "still being written");

        Ok(())
    }

    #[test]
    fn dropped_file_is_received_once_per_visibility_window() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_secs(60))?;
        drop_message(spool.path(), "m1.json", "{\"run_id\":\"r1\"}")?;

        // when
        let first = queue.receive(10, Duration::from_millis(10))?;
        let second = queue.receive(10, Duration::from_millis(10))?;

        // then
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].body, "{\"run_id\":\"r1\"}");
        assert_eq!(first[0].receive_count, 1);
        assert!(second.is_empty());

        Ok(())
    }

    #[test]
    fn expired_visibility_redelivers_with_incremented_count() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_millis(50))?;
        drop_message(spool.path(), "m1.json", "body")?;

        // when
        let first = queue.receive(10, Duration::from_millis(10))?;
        thread::sleep(Duration::from_millis(80));
        let second = queue.receive(10, Duration::from_millis(10))?;

        // then
        assert_eq!(first[0].receive_count, 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].receive_count, 2);
        assert_ne!(first[0].receipt, second[0].receipt);

        Ok(())
    }

    #[test]
    fn delete_removes_the_file_for_good() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_millis(50))?;
        drop_message(spool.path(), "m1.json", "body")?;
        let batch = queue.receive(10, Duration::from_millis(10))?;

        // when
        queue.delete(&batch[0].receipt)?;
        thread::sleep(Duration::from_millis(80));

        // then
        assert!(!spool.path().join("m1.json").exists());
        assert!(queue.receive(10, Duration::from_millis(10))?.is_empty());

        Ok(())
    }

    #[test]
    fn unknown_receipt_is_rejected() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_secs(60))?;

        // then
        assert_err!(queue.delete(&ReceiptHandle("bogus".into())));
        assert_err!(queue.extend_visibility(&ReceiptHandle("bogus".into()), Duration::from_secs(1)));

        Ok(())
    }

    #[test]
    fn stale_receipt_dies_on_redelivery() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_millis(30))?;
        drop_message(spool.path(), "m1.json", "body")?;
        let first = queue.receive(10, Duration::from_millis(10))?;
        thread::sleep(Duration::from_millis(60));
        let second = queue.receive(10, Duration::from_millis(10))?;

        // when - the original receipt belongs to a superseded delivery
        let stale = queue.delete(&first[0].receipt);

        // then
        assert_err!(stale);
        assert_ok!(queue.delete(&second[0].receipt));

        Ok(())
    }

    #[test]
    fn extended_visibility_postpones_redelivery() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_millis(40))?;
        drop_message(spool.path(), "m1.json", "body")?;
        let batch = queue.receive(10, Duration::from_millis(10))?;

        // when
        queue.extend_visibility(&batch[0].receipt, Duration::from_secs(60))?;
        thread::sleep(Duration::from_millis(80));

        // then - original window passed but the extension holds
        assert!(queue.receive(10, Duration::from_millis(10))?.is_empty());

        Ok(())
    }

    #[test]
    fn receive_respects_batch_size() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_secs(60))?;
        drop_message(spool.path(), "m1.json", "a")?;
        drop_message(spool.path(), "m2.json", "b")?;
        drop_message(spool.path(), "m3.json", "c")?;

        // when
        let batch = queue.receive(2, Duration::from_millis(10))?;

        // then
        assert_eq!(batch.len(), 2);

        Ok(())
    }

    #[test]
    fn empty_spool_waits_then_returns_empty() -> Result<()> {
        // given
        let spool = tempdir()?;
        let queue = open_queue(spool.path(), Duration::from_secs(60))?;

        // when
        let started = Instant::now();
        let batch = queue.receive(1, Duration::from_millis(120))?;

        // then
        assert!(batch.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(120));

        Ok(())
    }
}
