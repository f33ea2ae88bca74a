mod initialize;
pub use initialize::{Initializer, Running};

mod config;
pub use config::{Account, Config, Seed};

pub mod env {
    /// Env filter directive for the tracing subscriber.
    pub const LOG_DIRECTIVE: &str = "HRKIT_LOG";
}
