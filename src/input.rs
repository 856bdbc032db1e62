//! Step input definitions using clap derive
//!
//! Inputs follow the CI step convention: each input is supplied through an
//! environment variable, with a matching command line flag for local runs.
//! Requiredness and range checks live in [`Input::from_args`] rather than in
//! clap validators so that configuration failures carry the step's own error
//! types.

use crate::error::{StepError, StepResult};
use clap::Parser;

/// Save the Dart pub cache for later workflow runs
#[derive(Parser, Debug, Clone)]
#[command(name = "save-dart-cache")]
#[command(version, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(long, env = "verbose")]
    pub verbose: Option<bool>,

    /// Compression level of the archive, 1 (fastest) to 19 (smallest)
    #[arg(long, env = "compression_level")]
    pub compression_level: Option<i64>,
}

/// Validated step configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    /// Verbose logging requested
    pub verbose: bool,

    /// Archive compression level, guaranteed to be within 1..=19
    pub compression_level: u8,
}

impl Input {
    /// Validate raw arguments into a usable configuration
    pub fn from_args(args: &Args) -> StepResult<Self> {
        let verbose = args
            .verbose
            .ok_or(StepError::ConfigMissing { name: "verbose" })?;

        let level = args.compression_level.ok_or(StepError::ConfigMissing {
            name: "compression_level",
        })?;
        if !(1..=19).contains(&level) {
            return Err(StepError::ConfigInvalid {
                name: "compression_level",
                value: level.to_string(),
                reason: "must be between 1 and 19".to_string(),
            });
        }

        Ok(Self {
            verbose,
            compression_level: level as u8,
        })
    }
}
