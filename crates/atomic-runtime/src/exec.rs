//! Argument assembly for running commands inside existing containers.

use std::io::IsTerminal;

use atomic_common::error::{AtomicError, Result};

/// Returns whether the invoking process's stdin is an interactive terminal.
///
/// Decides whether `-t` is passed to `run` and `exec` invocations.
#[must_use]
pub fn stdin_is_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Builds the engine arguments for `exec` into a running container.
///
/// Stdin is always kept open; a pseudo-terminal is requested only when
/// `tty` is set.
///
/// # Errors
///
/// Returns `InvalidArgument` if the command is empty.
pub fn exec_args(container: &str, command: &[String], tty: bool) -> Result<Vec<String>> {
    if command.is_empty() {
        return Err(AtomicError::InvalidArgument {
            message: format!("no command given to execute in container {container}"),
        });
    }

    let mut args = vec!["exec".to_string(), "-i".to_string()];
    if tty {
        args.push("-t".to_string());
    }
    args.push(container.to_string());
    args.extend(command.iter().cloned());
    Ok(args)
}
