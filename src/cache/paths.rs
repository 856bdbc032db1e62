//! Home-relative path expansion
//!
//! Cache paths are written home-relative (`~/.pub-cache`) because the same
//! tool caches land in different absolute locations on different machine
//! images. Expansion happens as late as possible, in the saver.

use crate::error::{StepError, StepResult};
use std::path::PathBuf;

/// Expand a leading `~` to the user's home directory
///
/// Paths without a tilde prefix are returned unchanged.
pub fn expand(path: &str) -> StepResult<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| StepError::HomeDirUnavailable(path.to_string()))?;
        if path == "~" {
            return Ok(home);
        }
        return Ok(home.join(&path[2..]));
    }
    Ok(PathBuf::from(path))
}
