use thiserror::Error;

use crate::models::Platform;

/// A source could not be read at all. The adapter degrades to an empty list.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("page structure changed: {0}")]
    Structure(String),
}

/// One entry of an otherwise readable source could not be normalized.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("malformed entry: {0}")]
    Malformed(String),
    #[error("could not parse time {0:?}")]
    Time(String),
    #[error("local time {0:?} does not exist in {1}")]
    NonexistentLocalTime(String, &'static str),
    #[error("contest ends before it starts ({0}s)")]
    NegativeDuration(i64),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown source {0:?}; supported platforms are: {platforms}", platforms = supported_platforms())]
    UnknownSource(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

pub fn supported_platforms() -> String {
    Platform::ALL
        .iter()
        .map(|platform| platform.name())
        .collect::<Vec<_>>()
        .join(", ")
}
