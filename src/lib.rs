//! save-dart-cache — CI step that saves the Dart pub cache
//!
//! Archives `~/.pub-cache` to a content-addressed cache store under a key
//! derived from OS, CPU architecture, and the `pubspec.lock` checksum.

pub mod cache;
pub mod error;
pub mod input;
pub mod step;

pub use error::{StepError, StepResult};
