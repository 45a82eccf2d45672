//! Container engine abstraction.
//!
//! The lifecycle models never spawn the engine themselves. They issue the
//! handful of operations below through [`ContainerEngine`], which the
//! production [`docker::DockerCli`] implements on top of the engine's
//! command-line client.

pub mod docker;

use std::sync::Arc;

use atomic_common::config::AtomicConfig;
use atomic_common::error::Result;
use atomic_common::types::{ContainerId, EntityKind};
use serde_json::Value;

/// Command interface of an external container engine.
///
/// Every call blocks until the engine process exits. A non-zero exit is
/// reported as `AtomicError::EngineInvocation`, except for an inspection
/// that finds nothing, which is `Ok(None)`.
pub trait ContainerEngine: Send + Sync {
    /// Inspects an image or container, returning its full record.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails for any reason other than
    /// the entity not existing, or prints a malformed record.
    fn inspect(&self, kind: EntityKind, name: &str) -> Result<Option<Value>>;

    /// Pulls an image from its registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull fails.
    fn pull(&self, image: &str) -> Result<()>;

    /// Starts an existing, stopped container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be started.
    fn start(&self, name: &str) -> Result<()>;

    /// Stops a running container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be stopped.
    fn stop(&self, name: &str) -> Result<()>;

    /// Removes a container, optionally while it is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be removed.
    fn remove(&self, id: &str, force: bool) -> Result<()>;

    /// Lists the full ids of every container, running or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list_container_ids(&self) -> Result<Vec<ContainerId>>;

    /// Executes a command inside a running container with stdio attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty or exits non-zero.
    fn exec(&self, container: &str, command: &[String], tty: bool) -> Result<()>;

    /// Runs a fully rendered command line (such as a `docker run ...`
    /// template) with stdio attached and `env` added to its environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty, cannot be spawned, or
    /// exits non-zero.
    fn spawn(&self, argv: &[String], env: &[(String, String)]) -> Result<()>;

    /// Returns whether the engine client can be found on this host.
    fn is_available(&self) -> bool;
}

/// Creates the engine client described by the configuration.
#[must_use]
pub fn detect_engine(config: &AtomicConfig) -> Arc<dyn ContainerEngine> {
    Arc::new(docker::DockerCli::from_config(config))
}
