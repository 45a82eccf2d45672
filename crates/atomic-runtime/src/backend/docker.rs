//! Container engine backend driving the `docker` command-line client.
//!
//! Non-interactive calls (`inspect`, `pull`, `ps`, `start`, `stop`, `rm`)
//! capture output so failures carry the engine's diagnostics. Calls that
//! hand the terminal to the user (`exec`, rendered `run` templates) inherit
//! stdio and only report the exit status.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use atomic_common::config::AtomicConfig;
use atomic_common::constants::DOCKER_PROGRAM;
use atomic_common::error::{AtomicError, Result};
use atomic_common::types::{ContainerId, EntityKind};
use serde_json::Value;

use super::ContainerEngine;

/// Engine client that shells out to a docker-compatible binary.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: PathBuf,
}

impl DockerCli {
    /// Creates a client for the given engine binary.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Creates a client for the configured binary, locating it on `PATH`
    /// when the configured path does not exist.
    #[must_use]
    pub fn from_config(config: &AtomicConfig) -> Self {
        let configured = &config.docker_path;
        let program = which::which(configured)
            .or_else(|_| {
                let bare = configured
                    .file_name()
                    .map_or_else(|| PathBuf::from(DOCKER_PROGRAM), PathBuf::from);
                which::which(bare)
            })
            .unwrap_or_else(|_| configured.clone());
        tracing::debug!(program = %program.display(), "resolved engine client");
        Self { program }
    }

    /// Returns the engine binary this client invokes.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command_line(program: &Path, args: &[String]) -> String {
        std::iter::once(program.display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn capture(&self, args: &[String]) -> Result<Output> {
        tracing::debug!(cmd = %Self::command_line(&self.program, args), "invoking engine");
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| AtomicError::Io {
                path: self.program.clone(),
                source: e,
            })
    }

    /// Runs the engine with captured output and returns stdout on success.
    fn checked(&self, args: &[String]) -> Result<String> {
        let output = self.capture(args)?;
        if !output.status.success() {
            return Err(AtomicError::EngineInvocation {
                command: Self::command_line(&self.program, args),
                status: output.status.code(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs a program with inherited stdio.
    fn attached(&self, program: &Path, args: &[String], env: &[(String, String)]) -> Result<()> {
        tracing::debug!(cmd = %Self::command_line(program, args), "invoking attached");
        let status = Command::new(program)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .map_err(|e| AtomicError::Io {
                path: program.to_path_buf(),
                source: e,
            })?;
        if !status.success() {
            return Err(AtomicError::EngineInvocation {
                command: Self::command_line(program, args),
                status: status.code(),
                output: String::new(),
            });
        }
        Ok(())
    }
}

/// Interprets `inspect` stdout: a JSON array whose first element is the record.
fn parse_inspect_output(stdout: &[u8]) -> Result<Option<Value>> {
    let value: Value = serde_json::from_slice(stdout)?;
    match value {
        Value::Array(mut records) if !records.is_empty() => Ok(Some(records.swap_remove(0))),
        Value::Array(_) => Ok(None),
        other => Ok(Some(other)),
    }
}

/// Returns whether an `inspect` failure means the entity does not exist.
fn reports_missing(stderr: &[u8]) -> bool {
    String::from_utf8_lossy(stderr)
        .to_ascii_lowercase()
        .contains("no such")
}

impl ContainerEngine for DockerCli {
    fn inspect(&self, kind: EntityKind, name: &str) -> Result<Option<Value>> {
        let args = vec![
            "inspect".to_string(),
            "--type".to_string(),
            kind.as_str().to_string(),
            name.to_string(),
        ];
        let output = self.capture(&args)?;
        if output.status.success() {
            return parse_inspect_output(&output.stdout);
        }
        if reports_missing(&output.stderr) {
            tracing::debug!(%kind, name, "entity does not exist");
            return Ok(None);
        }
        Err(AtomicError::EngineInvocation {
            command: Self::command_line(&self.program, &args),
            status: output.status.code(),
            output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn pull(&self, image: &str) -> Result<()> {
        let _ = self.checked(&["pull".to_string(), image.to_string()])?;
        Ok(())
    }

    fn start(&self, name: &str) -> Result<()> {
        let _ = self.checked(&["start".to_string(), name.to_string()])?;
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        let _ = self.checked(&["stop".to_string(), name.to_string()])?;
        Ok(())
    }

    fn remove(&self, id: &str, force: bool) -> Result<()> {
        let mut args = vec!["rm".to_string()];
        if force {
            args.push("--force".to_string());
        }
        args.push(id.to_string());
        let _ = self.checked(&args)?;
        Ok(())
    }

    fn list_container_ids(&self) -> Result<Vec<ContainerId>> {
        let stdout = self.checked(&["ps".to_string(), "-aq".to_string(), "--no-trunc".to_string()])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ContainerId::new)
            .collect())
    }

    fn exec(&self, container: &str, command: &[String], tty: bool) -> Result<()> {
        let args = crate::exec::exec_args(container, command, tty)?;
        self.attached(&self.program, &args, &[])
    }

    fn spawn(&self, argv: &[String], env: &[(String, String)]) -> Result<()> {
        let Some((program, args)) = argv.split_first() else {
            return Err(AtomicError::InvalidArgument {
                message: "empty command line".into(),
            });
        };
        let program = if program == DOCKER_PROGRAM {
            self.program.clone()
        } else {
            PathBuf::from(program)
        };
        self.attached(&program, args, env)
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}
