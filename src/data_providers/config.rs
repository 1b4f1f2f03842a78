//! Filesystem implementations of the configuration interfaces.
use crate::result::ConfigurationErr;
use crate::use_cases::config::{CfgLoader, Config, ConfigLoader, ConfigResolver};

use std::fs::{create_dir_all, read_to_string, File};
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub struct FsConfigLoader;

/// Loads the configuration file.
///
/// Reads a toml file from the filesystem and decodes it into [`Config`].
impl ConfigLoader for FsConfigLoader {
    #[instrument(skip(self))]
    fn load(&self, path: &Path) -> Result<Config, ConfigurationErr> {
        Ok(toml::from_str(&read_to_string(path)?)?)
    }

    #[instrument(skip(self))]
    fn store(&self, path: &Path, cfg: &Config) -> Result<(), ConfigurationErr> {
        let config_dir = path.parent().ok_or_else(|| {
            ConfigurationErr::InvalidConfigPath("Can't use '/' as a configuration path".into())
        })?;
        create_dir_all(config_dir)?;
        let mut file = File::create(path)?;
        file.write_all(toml::to_string(cfg)?.as_bytes())?;
        Ok(())
    }
}

/// Handles configuration override.
///
/// Priority order: configuration override, then the default path. When neither
/// exists yet, defaults are stored at the target path so the next start finds
/// them.
pub struct FsConfigResolver {
    config_loader: CfgLoader,
    defaults: Config,
}

impl FsConfigResolver {
    pub fn new(config_loader: CfgLoader) -> Self {
        Self {
            config_loader,
            defaults: Config::default(),
        }
    }

    #[cfg(test)]
    fn with_defaults(config_loader: CfgLoader, defaults: Config) -> Self {
        Self {
            config_loader,
            defaults,
        }
    }
}

impl ConfigResolver for FsConfigResolver {
    #[instrument(skip(self))]
    fn handle_config(&self, path_override: Option<PathBuf>) -> Result<Config, ConfigurationErr> {
        let config_path = path_override.unwrap_or_else(config_path);
        let cfg = if config_path.exists() {
            debug!("loading config from '{}'", config_path.display());
            self.config_loader.load(&config_path)?
        } else {
            debug!("config path '{}' doesn't exist, storing defaults", config_path.display());
            let cfg = self.defaults.clone();
            self.config_loader.store(&config_path, &cfg)?;
            cfg
        };
        prepare_directories(&cfg)?;
        Ok(cfg)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .expect("failed to read system config directory")
        .join("vigia/vigia.toml")
}

fn prepare_directories(cfg: &Config) -> Result<(), ConfigurationErr> {
    if cfg.spool_dir.exists() && !cfg.spool_dir.is_dir() {
        return Err(ConfigurationErr::InvalidConfigPath(format!(
            "spool path needs to be a directory: '{}'",
            cfg.spool_dir.display()
        )));
    }
    create_dir_all(&cfg.spool_dir)?;
    Ok(())
}
