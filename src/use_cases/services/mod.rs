pub mod consumer;
pub mod matcher;
pub mod processor;
