//! Dashcam CLI library
//!
//! Command-line front end for the `dashcam` capture suites.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    BrowserArgs, Cli, ColorArg, Commands, ComparisonsArgs, DemoArgs, RecordArgs, VerifyArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{describe_outcome, ProgressReporter};
