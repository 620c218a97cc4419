use std::fmt::Display;

use reqwest::StatusCode;

use crate::value::PathNotFound;

/// Failure to deliver request or to read device reply
#[derive(Debug)]
pub enum TransportError {
    Encode(anyhow::Error),
    Http(reqwest::Error),
    Status(StatusCode),
    Decode(anyhow::Error),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Encode(_) => write!(f, "Failed to encode request"),
            TransportError::Http(_) => write!(f, "Http request failed"),
            TransportError::Status(status) => write!(f, "Device responded with status {status}"),
            TransportError::Decode(_) => write!(f, "Failed to decode reply"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Encode(e) => Some(&**e),
            TransportError::Http(e) => Some(e),
            TransportError::Status(_) => None,
            TransportError::Decode(e) => Some(&**e),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

#[derive(Debug)]
pub enum Error {
    Transport(TransportError),
    PathNotFound(PathNotFound),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport(_) => write!(f, "Device request failed"),
            Error::PathNotFound(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::PathNotFound(_) => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<PathNotFound> for Error {
    fn from(value: PathNotFound) -> Self {
        Self::PathNotFound(value)
    }
}
