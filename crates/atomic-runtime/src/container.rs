//! Container model: state queries and lifecycle primitives.
//!
//! Every mutating call refreshes the snapshot before returning, so callers
//! observe the engine's state immediately after a successful call.

use std::sync::Arc;

use atomic_common::error::Result;
use atomic_common::types::{ContainerState, EntityKind, ImageId};
use serde_json::Value;

use crate::backend::ContainerEngine;
use crate::inspect::Inspection;

/// A container identity, which may or may not exist in the engine.
pub struct Container {
    engine: Arc<dyn ContainerEngine>,
    inspection: Inspection,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("inspection", &self.inspection)
            .finish_non_exhaustive()
    }
}

impl Container {
    /// Inspects the container by name or id.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    pub fn new(engine: Arc<dyn ContainerEngine>, name: &str) -> Result<Self> {
        let inspection = Inspection::new(engine.as_ref(), EntityKind::Container, name)?;
        Ok(Self { engine, inspection })
    }

    /// Name (or id) the container is looked up by.
    #[must_use]
    pub fn name(&self) -> &str {
        self.inspection.name()
    }

    /// Whether the container existed at the last refresh.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.inspection.exists()
    }

    /// The underlying inspection snapshot.
    #[must_use]
    pub const fn inspection(&self) -> &Inspection {
        &self.inspection
    }

    /// Re-inspects the container.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    pub fn refresh(&mut self) -> Result<()> {
        self.inspection.refresh(self.engine.as_ref())
    }

    /// Whether the container was running at the last refresh.
    #[must_use]
    pub fn running(&self) -> bool {
        self.inspection
            .field("/State/Running")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether stdin, stdout and stderr are all attached.
    #[must_use]
    pub fn interactive(&self) -> bool {
        ["AttachStdin", "AttachStdout", "AttachStderr"]
            .iter()
            .all(|flag| {
                self.inspection
                    .field(&format!("/Config/{flag}"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
    }

    /// PID of the container's init process while it is running.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        if !self.running() {
            return None;
        }
        self.inspection
            .field("/State/Pid")
            .and_then(Value::as_u64)
            .filter(|pid| *pid > 0)
            .and_then(|pid| u32::try_from(pid).ok())
    }

    /// IP address on the default network, if any.
    #[must_use]
    pub fn address(&self) -> Option<String> {
        self.inspection
            .field("/NetworkSettings/IPAddress")
            .and_then(Value::as_str)
            .filter(|addr| !addr.is_empty())
            .map(ToString::to_string)
    }

    /// Id of the image the container was created from.
    #[must_use]
    pub fn image_id(&self) -> Option<ImageId> {
        self.inspection
            .field("/Image")
            .and_then(Value::as_str)
            .map(ImageId::new)
    }

    /// Observed lifecycle state.
    #[must_use]
    pub fn state(&self) -> ContainerState {
        if !self.exists() {
            ContainerState::Absent
        } else if self.running() {
            ContainerState::Running
        } else {
            ContainerState::Stopped
        }
    }

    /// Starts the container unless it is already running.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to start it.
    pub fn start(&mut self) -> Result<()> {
        if self.running() {
            tracing::info!(container = %self.name(), "container is already running");
            return Ok(());
        }
        tracing::info!(container = %self.name(), "starting container");
        self.engine.start(self.name())?;
        self.refresh()
    }

    /// Stops the container if it is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to stop it.
    pub fn stop(&mut self) -> Result<()> {
        if !self.running() {
            tracing::info!(container = %self.name(), "container is not running");
            return Ok(());
        }
        tracing::info!(container = %self.name(), "stopping container");
        self.engine.stop(self.name())?;
        self.refresh()
    }

    /// Removes the container; `force` removes it even while running.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the removal.
    pub fn delete(&mut self, force: bool) -> Result<()> {
        tracing::info!(container = %self.name(), force, "deleting container");
        let target = self
            .inspection
            .id()
            .map_or_else(|| self.name().to_string(), ToString::to_string);
        self.engine.remove(&target, force)?;
        self.refresh()
    }
}
