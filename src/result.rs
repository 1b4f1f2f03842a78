use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationErr {
    #[error("failed to read or write configuration file: '{0}'")]
    Io(#[from] std::io::Error),

    #[error("error when deserializing from toml: '{0}'")]
    TomlDe(#[from] toml::de::Error),

    #[error("error when serializing to toml: '{0}'")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid configuration path: '{0}'")]
    InvalidConfigPath(String),

    #[error("failed to load keywords: '{0}'")]
    Keywords(String),

    #[error("no keywords configured, refusing to start with an empty keyword set")]
    NoKeywords,
}

#[derive(Debug, Error)]
pub enum EnvelopeErr {
    #[error("message body is not valid json: '{0}'")]
    Json(#[from] serde_json::Error),

    #[error("envelope is missing required field: '{0}'")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum FetchErr {
    #[error("failed to read document: '{0}'")]
    Io(#[from] std::io::Error),

    #[error("document is not valid utf8: '{0}'")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unsupported document reference: '{0}'")]
    UnsupportedRef(String),
}

#[derive(Debug, Error)]
pub enum QueueErr {
    #[error("failed to access message spool: '{0}'")]
    Io(#[from] std::io::Error),

    #[error("unknown or expired receipt handle: '{0}'")]
    UnknownReceipt(String),

    #[error("queue state poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ConsumerErr {
    #[error("failed to build worker pool: '{0}'")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum SinkErr {
    #[error("failed to write alert: '{0}'")]
    Io(#[from] std::io::Error),

    #[error("alert delivery failed: '{0}'")]
    Delivery(String),
}
