use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unsupported config file format '{extension}': {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("malformed config file '{path}': {message}")]
    MalformedContent { path: PathBuf, message: String },

    #[error("configuration is locked")]
    Locked,

    #[error("config path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("failed to read config path '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::MalformedContent {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Maps an I/O error for `path`, turning `NotFound` into [`ConfigError::PathNotFound`].
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::PathNotFound(path)
        } else {
            Self::ReadError { path, source }
        }
    }
}
