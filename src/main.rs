//! save-dart-cache — CI step entry point
//!
//! Reads the step inputs from the process environment, then saves the
//! Dart pub cache through the configured saver backend.

use clap::Parser;
use console::style;
use save_dart_cache::cache::LocalStore;
use save_dart_cache::input::Args;
use save_dart_cache::step::SaveCacheStep;
use save_dart_cache::StepResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> StepResult<()> {
    let args = Args::parse();

    // Verbose mode raises logging to debug for the remainder of the run
    let filter = if args.verbose.unwrap_or(false) {
        EnvFilter::new("save_dart_cache=debug")
    } else {
        EnvFilter::new("save_dart_cache=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let store = LocalStore::open_default();
    SaveCacheStep::new(args, Box::new(store)).run().await
}
