#![allow(clippy::module_name_repetitions)]

use crate::configuration::factories::{
    alert_sink, config_loader, config_resolver, fetcher, keyword_book, message_queue,
};
use crate::configuration::telemetry::init_tracing;
use crate::entities::document::{DocumentKind, DocumentRef};
use crate::entities::envelope::AnalysisEvent;
use crate::use_cases::config::ConfigResolver;
use crate::use_cases::services::consumer::{ConsumerLoop, PollOpts};
use crate::use_cases::sink::AlertSink;
use crate::use_cases::services::processor::{ProcessOutcome, Processor};

use std::env;
use std::path::PathBuf;
use tracing::info;

mod configuration;
mod data_providers;
mod entities;
mod use_cases;

mod helpers;
mod result;
#[cfg(test)]
mod testingtools;

fn main() {
    init_tracing();

    let path_override = env::var("VIGIA_CONFIG_PATH")
        .ok()
        .or_else(|| env::args().nth(1))
        .map(PathBuf::from);

    let resolver = config_resolver(config_loader());
    let cfg = resolver
        .handle_config(path_override)
        .expect("failed to get config");

    let keywords = keyword_book(&cfg).expect("failed to load keywords");
    info!(
        "loaded {} global keyword(s) and {} commission-specific set(s)",
        keywords.global_count(),
        keywords.commission_count()
    );

    let processor = Processor::new(fetcher(), keywords);

    // one-shot diagnostic mode: evaluate a known document, print, exit
    if let Ok(check_file) = env::var("VIGIA_CHECK_FILE") {
        run_check(&processor, &check_file);
        return;
    }

    let queue = message_queue(&cfg).expect("failed to open spool queue");
    let consumer = ConsumerLoop::new(queue, processor, alert_sink(), PollOpts::from(&cfg));

    let switch = consumer.shutdown_switch();
    ctrlc::set_handler(move || {
        info!("shutting down, letting in-flight messages finish");
        switch.trip();
    })
    .expect("failed to set signal handler");

    info!("starting alerts service, polling '{}'", cfg.spool_dir.display());
    consumer.run().expect("consumer loop failed");
    info!("alerts service stopped");
}

fn run_check(processor: &Processor, check_file: &str) {
    info!("running in check mode with file: '{}'", check_file);
    let event = AnalysisEvent {
        run_id: "check".into(),
        source: "check".into(),
        committee: Some("Test Committee".into()),
        date: None,
        transcript: DocumentRef::new(DocumentKind::Transcript, check_file),
        analysis: DocumentRef::new(DocumentKind::Analysis, check_file),
        pdf: None,
    };
    match processor.process(&event) {
        ProcessOutcome::Alert(alert) => {
            alert_sink().emit(&alert).expect("failed to print alert");
        }
        ProcessOutcome::NoMatch => println!("no keyword matches in '{check_file}'"),
        ProcessOutcome::FetchFailure => println!("could not read '{check_file}'"),
    }
}
