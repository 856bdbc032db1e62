//! Cache key template resolution
//!
//! Keys are written as templates so that one key string can describe a
//! family of cache entries: `{OS}` and `{Arch}` pin the entry to a stack,
//! and `{checksum(FILE)}` pins it to the exact dependency lock state.
//! Example: `{OS}-{Arch}-dart-cache-{checksum(pubspec.lock)}` resolves to
//! `linux-x86_64-dart-cache-<sha256>`.

use crate::error::{StepError, StepResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Values a key template is resolved against
#[derive(Debug, Clone)]
pub struct TemplateContext {
    /// Operating system name, e.g. `linux`
    pub os: String,

    /// CPU architecture, e.g. `x86_64`
    pub arch: String,

    /// Directory that `checksum(FILE)` arguments are resolved against
    pub workdir: PathBuf,
}

impl TemplateContext {
    /// Context describing the machine the step is running on
    pub fn for_host(workdir: impl Into<PathBuf>) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            workdir: workdir.into(),
        }
    }
}

/// Resolve all placeholders in a key template
///
/// Literal text is copied through unchanged. An unknown placeholder or an
/// unterminated `{` is an error; a missing checksum file resolves to the
/// empty string so that a fresh checkout still produces a usable key.
pub fn resolve(template: &str, ctx: &TemplateContext) -> StepResult<String> {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| StepError::KeyTemplate {
            template: template.to_string(),
            reason: "unterminated placeholder".to_string(),
        })?;

        let placeholder = &after[..end];
        resolved.push_str(&expand_placeholder(placeholder, template, ctx)?);
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);

    debug!("Resolved cache key template {:?} to {:?}", template, resolved);
    Ok(resolved)
}

fn expand_placeholder(
    placeholder: &str,
    template: &str,
    ctx: &TemplateContext,
) -> StepResult<String> {
    match placeholder {
        "OS" => Ok(ctx.os.clone()),
        "Arch" => Ok(ctx.arch.clone()),
        _ => {
            if let Some(file) = placeholder
                .strip_prefix("checksum(")
                .and_then(|p| p.strip_suffix(')'))
            {
                checksum_file(&ctx.workdir.join(file))
            } else {
                Err(StepError::KeyTemplate {
                    template: template.to_string(),
                    reason: format!("unknown placeholder {{{placeholder}}}"),
                })
            }
        }
    }
}

/// SHA-256 of a file's contents as lowercase hex
///
/// A file that does not exist resolves to the empty string with a warning.
fn checksum_file(path: &Path) -> StepResult<String> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                "Checksum file not found, resolving to empty string: {}",
                path.display()
            );
            return Ok(String::new());
        }
        Err(e) => {
            return Err(StepError::io(
                format!("reading checksum file {}", path.display()),
                e,
            ))
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(hex::encode(hasher.finalize()))
}
