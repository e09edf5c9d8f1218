use thiserror::Error;

use crate::feedback::ResponseId;

/// Errors raised while constructing a [`crate::results::ResultsBundle`].
///
/// Lookups that fail *after* construction (unknown emails, responses whose
/// question has been deleted) are resolved to sentinel values instead.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("response {0} appears more than once")]
    DuplicateResponse(ResponseId),

    #[error("anonymization key rejected: {0}")]
    Anonymizer(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(
        "no anonymization key: set `SECRET_KEY` or `anonymization_key` in \
         the config file"
    )]
    MissingKey,
}
