// touchminer library.
// Mines GitHub commit history into per-file touch tables and writes them as CSV.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod logging;
pub mod mining;

pub use error::{MinerError, Result};
