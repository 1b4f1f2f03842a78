//! Console implementation of [`crate::use_cases::sink::AlertSink`].
use crate::entities::alert::AlertRecord;
use crate::result::SinkErr;
use crate::use_cases::sink::AlertSink;

use std::fmt::Debug;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::info;

const RULE: &str =
    "================================================================================";

/// Prints the alert banner to a writer (stdout by default).
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("console sink")
    }
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for ConsoleSink {
    fn emit(&self, alert: &AlertRecord) -> Result<(), SinkErr> {
        let mut keywords = alert.keywords.clone();
        keywords.sort();
        let found_in: Vec<String> = alert.found_in.iter().map(ToString::to_string).collect();
        let pdf = alert
            .pdf
            .as_ref()
            .map_or_else(|| "N/A".to_string(), |p| p.uri.clone());

        let mut out = self.out.lock().map_err(|_| {
            SinkErr::Delivery("console writer poisoned".into())
        })?;
        writeln!(out)?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "KEYWORD ALERT")?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "Run ID: {}", alert.run_id)?;
        writeln!(out, "Source: {}", alert.source.to_uppercase())?;
        writeln!(out, "Committee: {}", alert.committee)?;
        writeln!(out, "Date: {}", alert.date)?;
        writeln!(out, "Matched Keywords: {}", keywords.join(", "))?;
        writeln!(out, "Found in: {}", found_in.join(", "))?;
        writeln!(out, "Transcript: {}", alert.transcript.uri)?;
        writeln!(out, "Analysis: {}", alert.analysis.uri)?;
        writeln!(out, "PDF: {pdf}")?;
        writeln!(out, "{RULE}")?;
        out.flush()?;
        info!(
            "ALERT: {} keyword(s) matched for run_id={}",
            alert.keywords.len(),
            alert.run_id
        );
        Ok(())
    }
}
