//! Interface for loading and saving the [`Config`] structure.
//!
//! Where the config is stored is not tied to this interface and is considered
//! an implementation detail.
use crate::result::ConfigurationErr;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type CfgLoader = Box<dyn ConfigLoader>;
pub type CfgResolver = Box<dyn ConfigResolver>;

/// Responsible for reading/saving the configuration from/to some medium.
pub trait ConfigLoader: Send {
    fn load(&self, path: &Path) -> Result<Config, ConfigurationErr>;

    fn store(&self, path: &Path, cfg: &Config) -> Result<(), ConfigurationErr>;
}

/// Handles config override.
///
/// When the user specifies a configuration path during startup, this interface
/// handles that case; `None` means the default location is used.
pub trait ConfigResolver: Send {
    fn handle_config(&self, path_override: Option<PathBuf>) -> Result<Config, ConfigurationErr>;
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory watched for message files (one JSON event per file).
    pub spool_dir: PathBuf,

    /// Max messages pulled per poll.
    #[serde(default = "batch_size_default")]
    pub batch_size: usize,

    /// How long one receive call waits for the first message.
    #[serde(default = "wait_time_default")]
    pub wait_time_secs: u64,

    /// Backoff window applied to messages left for retry.
    #[serde(default = "visibility_timeout_default")]
    pub visibility_timeout_secs: u64,

    /// Floor on the interval between polls, so short polls don't busy-spin.
    #[serde(default = "min_poll_interval_default")]
    pub min_poll_interval_millis: u64,

    /// Worker pool size for one batch's entries.
    #[serde(default = "pool_size_default")]
    pub pool_size: usize,

    /// Comma-separated global keywords.
    #[serde(default)]
    pub keywords_inline: Option<String>,

    /// Path to a JSON keywords file.
    #[serde(default)]
    pub keywords_file: Option<PathBuf>,
}

impl Config {
    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_time_secs)
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }

    pub fn min_poll_interval(&self) -> Duration {
        Duration::from_millis(self.min_poll_interval_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spool_dir: spool_dir_default(),
            batch_size: batch_size_default(),
            wait_time_secs: wait_time_default(),
            visibility_timeout_secs: visibility_timeout_default(),
            min_poll_interval_millis: min_poll_interval_default(),
            pool_size: pool_size_default(),
            keywords_inline: None,
            keywords_file: None,
        }
    }
}

impl AsRef<Config> for Config {
    fn as_ref(&self) -> &Config {
        self
    }
}

fn spool_dir_default() -> PathBuf {
    dirs::data_dir()
        .expect("failed to read system data path")
        .join("vigia/spool")
}

fn batch_size_default() -> usize {
    1
}

fn wait_time_default() -> u64 {
    10
}

fn visibility_timeout_default() -> u64 {
    300
}

fn min_poll_interval_default() -> u64 {
    500
}

fn pool_size_default() -> usize {
    1
}
