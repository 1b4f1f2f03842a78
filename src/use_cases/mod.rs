pub mod config;
pub mod fetcher;
pub mod keywords;
pub mod queue;
pub mod sink;

pub mod services;
