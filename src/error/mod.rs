pub(crate) mod internal;

use std::fmt;
use std::io;

use crate::error::internal::ErrorKind;

#[derive(Debug)]
pub enum HrkitError {
    // A signed-in principal is required for the operation.
    Unauthenticated,
    InvalidCredentials { email: String },
    EmailAlreadyInUse { email: String },
    DocumentNotFound { collection: String, id: String },
    // The stored document could not be mapped to the requested type.
    InvalidDocument { description: String },
    InvalidInput(String),
    // The document store rejected or failed the request.
    Store(String),
    Io(io::Error),
    Config(String),
    Internal(String),
}

impl fmt::Display for HrkitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HrkitError::Unauthenticated => write!(f, "unauthenticated"),
            HrkitError::InvalidCredentials { email } => {
                write!(f, "invalid credentials for {}", email)
            }
            HrkitError::EmailAlreadyInUse { email } => {
                write!(f, "email already in use: {}", email)
            }
            HrkitError::DocumentNotFound { collection, id } => {
                write!(f, "document {}/{} not found", collection, id)
            }
            HrkitError::InvalidDocument { description } => {
                write!(f, "invalid document. {}", description)
            }
            HrkitError::InvalidInput(description) => write!(f, "invalid input. {}", description),
            HrkitError::Store(description) => write!(f, "document store error. {}", description),
            HrkitError::Io(err) => err.fmt(f),
            HrkitError::Config(description) => write!(f, "config error. {}", description),
            HrkitError::Internal(description) => write!(f, "internal error. {}", description),
        }
    }
}

impl std::error::Error for HrkitError {}

impl From<io::Error> for HrkitError {
    fn from(err: io::Error) -> Self {
        HrkitError::Io(err)
    }
}

impl From<serde_json::Error> for HrkitError {
    fn from(err: serde_json::Error) -> Self {
        HrkitError::InvalidDocument {
            description: err.to_string(),
        }
    }
}

impl From<internal::Error> for HrkitError {
    fn from(err: internal::Error) -> Self {
        if let Some(backtrace) = err.backtrace() {
            tracing::trace!("{:?}", backtrace);
        }
        match err.into_kind() {
            ErrorKind::Io(err) => HrkitError::Io(err),
            ErrorKind::Yaml(err) => HrkitError::Config(err.to_string()),
            ErrorKind::Seed { description } => HrkitError::Config(description),
            ErrorKind::Internal(description) => HrkitError::Internal(description),
        }
    }
}
