//! Error types for the ergonomic xyzt.ai client

use thiserror::Error;

use crate::upload::UploadKind;

#[derive(Error, Debug)]
pub enum Error {
    /// The token request was rejected
    #[error("Request for auth token failed with status {status}: {message}")]
    Authentication { status: u16, message: String },

    /// A local precondition was violated; no request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upload of a records or metadata file was rejected
    #[error("Upload of {kind} file failed with status {status}: {message}")]
    Upload {
        kind: UploadKind,
        status: u16,
        message: String,
    },

    /// Batch deletion could not be scheduled
    #[error("Deletion of batch \"{batch}\" failed with status {status}: {message}")]
    Deletion {
        batch: String,
        status: u16,
        message: String,
    },

    /// Listing datasets failed
    #[error("Retrieval of datasets failed with status {status}: {message}")]
    Retrieval { status: u16, message: String },

    /// The server answered with a body that is not the JSON we expected
    #[error("Malformed response (status {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest_middleware::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(reqwest_middleware::Error::Reqwest(err))
    }
}

impl Error {
    /// HTTP status code carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. }
            | Error::Upload { status, .. }
            | Error::Deletion { status, .. }
            | Error::Retrieval { status, .. }
            | Error::MalformedResponse { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server supplied message for rejected requests
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Authentication { message, .. }
            | Error::Upload { message, .. }
            | Error::Deletion { message, .. }
            | Error::Retrieval { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the error was raised before anything was sent over the network
    pub fn is_local(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Configuration(_) | Error::Io(_))
    }
}
