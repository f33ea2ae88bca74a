//! Command line interface of the `hrkit` binary.

pub mod audit;
pub mod navigate;
pub mod overview;
pub mod root;
pub mod routes;

pub use root::{parse, AppOptions, Command, HrkitCommand};

use serde::Serialize;

use crate::Result;

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
