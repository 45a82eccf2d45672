//! Passthrough to the host's update tool.

use std::process::Command;

use atomic_common::error::{AtomicError, Result};

/// Runs the host update tool with the given arguments, stdio attached.
///
/// # Errors
///
/// Returns an error if the tool cannot be spawned or exits non-zero.
pub fn passthrough(tool: &str, args: &[String]) -> Result<()> {
    tracing::debug!(tool, ?args, "running host tool");
    let status = Command::new(tool)
        .args(args)
        .status()
        .map_err(|e| AtomicError::Io {
            path: tool.into(),
            source: e,
        })?;
    if !status.success() {
        return Err(AtomicError::EngineInvocation {
            command: std::iter::once(tool.to_string())
                .chain(args.iter().cloned())
                .collect::<Vec<_>>()
                .join(" "),
            status: status.code(),
            output: String::new(),
        });
    }
    Ok(())
}
