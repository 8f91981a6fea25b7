// src/lib.rs
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod io;
pub mod processing;
pub mod render;
pub mod utils;
pub mod workflows;

pub use config::Config;
pub use error::{Error, Result};
pub use workflows::{RunOutcome, RunReport, Workflow};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
