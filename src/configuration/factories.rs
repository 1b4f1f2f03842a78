use crate::data_providers::config::{FsConfigLoader, FsConfigResolver};
use crate::data_providers::fetcher::FsFetcher;
use crate::data_providers::keywords::{InlineSource, JsonFileSource};
use crate::data_providers::queue::SpoolQueue;
use crate::data_providers::sink::ConsoleSink;
use crate::entities::keywords::KeywordBook;
use crate::result::{ConfigurationErr, QueueErr};
use crate::use_cases::config::{CfgLoader, CfgResolver, Config};
use crate::use_cases::fetcher::Fetcher;
use crate::use_cases::keywords::{KeywordSource, KeywordSrc, KeywordsDoc};
use crate::use_cases::queue::MessageQueue;
use crate::use_cases::sink::Sink;

use std::sync::Arc;

pub fn config_resolver(config_loader: CfgLoader) -> CfgResolver {
    Box::new(FsConfigResolver::new(config_loader))
}

pub fn config_loader() -> CfgLoader {
    Box::new(FsConfigLoader)
}

pub fn message_queue(cfg: &Config) -> Result<MessageQueue, QueueErr> {
    Ok(Arc::new(SpoolQueue::new(
        &cfg.spool_dir,
        cfg.visibility_timeout(),
    )?))
}

pub fn fetcher() -> Fetcher {
    Arc::new(FsFetcher::new())
}

pub fn alert_sink() -> Sink {
    Arc::new(ConsoleSink::new())
}

pub fn keyword_sources(cfg: &Config) -> Vec<KeywordSrc> {
    let mut sources: Vec<KeywordSrc> = Vec::new();
    if let Some(inline) = &cfg.keywords_inline {
        sources.push(Box::new(InlineSource::new(inline.clone())));
    }
    if let Some(file) = &cfg.keywords_file {
        sources.push(Box::new(JsonFileSource::new(file.clone())));
    }
    sources
}

/// Resolves all configured sources and builds the immutable keyword book.
pub fn keyword_book(cfg: &Config) -> Result<Arc<KeywordBook>, ConfigurationErr> {
    let mut doc = KeywordsDoc::default();
    for source in keyword_sources(cfg) {
        doc.merge(source.resolve()?);
    }
    Ok(Arc::new(KeywordBook::build(doc.global, doc.commissions)?))
}
