//! The cache-save step
//!
//! Validates inputs, prints what is about to be saved, builds a single save
//! request, and delegates the archival work to the configured saver.

use crate::cache::saver::{CacheSaver, SaveCacheRequest};
use crate::error::{StepError, StepResult};
use crate::input::{Args, Input};
use console::style;
use tracing::debug;

/// Step identifier used in error context and logs
pub const STEP_ID: &str = "save-dart-cache";

/// Cache key template
///
/// OS + architecture guarantee a unique cache per stack: the cached files
/// live under the home directory, so absolute paths are not portable
/// between machine images.
pub const CACHE_KEY_TEMPLATE: &str = "{OS}-{Arch}-dart-cache-{checksum(pubspec.lock)}";

/// Cached path
pub const CACHE_PATH: &str = "~/.pub-cache";

/// The save-dart-cache step
pub struct SaveCacheStep {
    args: Args,
    saver: Box<dyn CacheSaver>,
}

impl SaveCacheStep {
    /// Create a step from raw arguments and a saver backend
    pub fn new(args: Args, saver: Box<dyn CacheSaver>) -> Self {
        Self { args, saver }
    }

    /// Run the step: validate inputs, print diagnostics, save the cache
    pub async fn run(&self) -> StepResult<()> {
        let input = Input::from_args(&self.args)?;
        print_config(&input);

        debug!("Delegating to the cache saver");
        let request = SaveCacheRequest {
            step_id: STEP_ID.to_string(),
            verbose: input.verbose,
            key: CACHE_KEY_TEMPLATE.to_string(),
            paths: vec![CACHE_PATH.to_string()],
            is_key_unique: true,
            compression_level: input.compression_level,
        };

        self.saver
            .save(&request)
            .await
            .map_err(|e| StepError::SaveFailed {
                step_id: STEP_ID,
                source: Box::new(e),
            })
    }
}

/// Print the parsed configuration and the cache contract about to be used
fn print_config(input: &Input) {
    println!("{}", style("Configuration:").bold());
    println!("- verbose: {}", input.verbose);
    println!("- compression_level: {}", input.compression_level);
    println!();
    println!("Cache key: {CACHE_KEY_TEMPLATE}");
    println!("Cache paths:");
    println!("{CACHE_PATH}");
    println!();
}
