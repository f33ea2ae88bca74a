#![allow(clippy::module_inception)]

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod hr;

pub use crate::error::HrkitError;
pub type Result<T, E = crate::error::HrkitError> = std::result::Result<T, E>;

pub use crate::core::{Principal, Role, Session};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub use tracing::{debug, error, info, trace, warn};
}
