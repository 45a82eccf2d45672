//! Image model: label queries and pull-on-demand.
//!
//! Reads that need the image to be present locally (`info`, `extra_info`,
//! `version`) pull it first when it is missing. The pull is not memoized:
//! each such call performs at most one pull.

use std::sync::Arc;

use atomic_common::config::AtomicConfig;
use atomic_common::constants::{LABEL_NAME, LABEL_RELEASE, LABEL_VERSION, TRUTHY_LABEL_VALUES};
use atomic_common::error::Result;
use atomic_common::types::{EntityKind, ImageId, ImageVersion, Labels};
use serde_json::Value;

use crate::backend::ContainerEngine;
use crate::container::Container;
use crate::inspect::Inspection;

/// Returns whether a label key is reserved for tooling rather than
/// describing the application.
///
/// Keys with a `:` or `.` are namespaced, as are keys that start with an
/// upper-case letter or contain no lower-case letters (`Name`, `FOO`).
#[must_use]
pub fn is_namespaced_label(key: &str) -> bool {
    if key.contains(':') || key.contains('.') {
        return true;
    }
    let starts_upper = key.chars().next().is_some_and(char::is_uppercase);
    let has_cased = key.chars().any(char::is_alphabetic);
    let all_upper = has_cased && !key.chars().any(char::is_lowercase);
    starts_upper || all_upper
}

/// Derives a container name from an image reference: the last path
/// segment with any tag or digest removed.
#[must_use]
pub fn default_container_name(reference: &str) -> String {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    let without_digest = last.split('@').next().unwrap_or(last);
    without_digest
        .split(':')
        .next()
        .unwrap_or(without_digest)
        .to_string()
}

/// Parses a boolean label value.
#[must_use]
pub fn parse_boolean_label(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        TRUTHY_LABEL_VALUES
            .iter()
            .any(|truthy| v.trim().eq_ignore_ascii_case(truthy))
    })
}

/// A container image known to the engine (or pullable into it).
pub struct Image {
    engine: Arc<dyn ContainerEngine>,
    inspection: Inspection,
    default_command: Vec<String>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("inspection", &self.inspection)
            .finish_non_exhaustive()
    }
}

impl Image {
    /// Inspects the image by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    pub fn new(engine: Arc<dyn ContainerEngine>, config: &AtomicConfig, name: &str) -> Result<Self> {
        let inspection = Inspection::new(engine.as_ref(), EntityKind::Image, name)?;
        Ok(Self {
            engine,
            inspection,
            default_command: config.default_command.clone(),
        })
    }

    /// Image reference as given by the caller.
    #[must_use]
    pub fn name(&self) -> &str {
        self.inspection.name()
    }

    /// Whether the image was present at the last refresh.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.inspection.exists()
    }

    /// Engine-assigned image id, when present.
    #[must_use]
    pub fn id(&self) -> Option<ImageId> {
        self.inspection.id().map(ImageId::new)
    }

    /// The underlying inspection snapshot.
    #[must_use]
    pub const fn inspection(&self) -> &Inspection {
        &self.inspection
    }

    /// Re-inspects the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    pub fn refresh(&mut self) -> Result<()> {
        self.inspection.refresh(self.engine.as_ref())
    }

    /// Name a container created from this image gets by default.
    #[must_use]
    pub fn default_container_name(&self) -> String {
        default_container_name(self.name())
    }

    /// Pulls the image regardless of whether it is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull or the follow-up inspection fails.
    pub fn pull(&mut self) -> Result<()> {
        tracing::info!(image = %self.name(), "pulling image");
        self.engine.pull(self.name())?;
        self.refresh()
    }

    /// Pulls the image only if it was absent at the last refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if a needed pull fails.
    pub fn pull_if_missing(&mut self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }
        self.pull()
    }

    /// Pulls a fresh copy of the image. With `force`, every container
    /// created from the current image is deleted first.
    ///
    /// # Errors
    ///
    /// Returns an error if deleting a container or pulling fails.
    pub fn update(&mut self, force: bool) -> Result<()> {
        if force {
            let deleted = self.force_delete_containers()?;
            tracing::debug!(image = %self.name(), deleted, "removed dependent containers");
        }
        self.pull()
    }

    /// Force-deletes every container whose image is this image.
    ///
    /// Returns the number of containers deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if listing, inspecting, or deleting fails.
    pub fn force_delete_containers(&self) -> Result<usize> {
        let Some(image_id) = self.id() else {
            return Ok(0);
        };
        tracing::warn!(image = %self.name(), "deleting containers using image");

        let mut deleted = 0;
        for id in self.engine.list_container_ids()? {
            let mut container = Container::new(Arc::clone(&self.engine), id.as_str())?;
            if container.image_id().as_ref() == Some(&image_id) {
                tracing::warn!(container = %id, "deleting container");
                container.delete(true)?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// The image's declared command, or the configured default.
    #[must_use]
    pub fn command(&self) -> Vec<String> {
        self.inspection
            .field("/Config/Cmd")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|cmd| !cmd.is_empty())
            .unwrap_or_else(|| self.default_command.clone())
    }

    /// All labels of the image as last inspected; empty when absent.
    #[must_use]
    pub fn labels(&self) -> Labels {
        self.inspection.labels().unwrap_or_default()
    }

    /// Looks up one label.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<String> {
        self.inspection
            .field("/Config/Labels")
            .and_then(|labels| labels.get(key))
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }

    /// Interprets a label as a boolean (`1`, `true`, `yes`).
    #[must_use]
    pub fn boolean_label(&self, key: &str) -> bool {
        parse_boolean_label(self.label(key).as_deref())
    }

    /// Labels describing the application (not namespaced).
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be pulled or inspected.
    pub fn info(&mut self) -> Result<Labels> {
        self.pull_if_missing()?;
        let mut labels = self.inspection.labels()?;
        labels.retain(|k, _| !is_namespaced_label(k));
        Ok(labels)
    }

    /// Namespaced labels reserved for tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be pulled or inspected.
    pub fn extra_info(&mut self) -> Result<Labels> {
        self.pull_if_missing()?;
        let mut labels = self.inspection.labels()?;
        labels.retain(|k, _| is_namespaced_label(k));
        Ok(labels)
    }

    /// Name-Version-Release of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be pulled or inspected. A
    /// missing label is not an error: it yields `Unavailable`.
    pub fn version(&mut self) -> Result<ImageVersion> {
        self.pull_if_missing()?;
        let labels = self.inspection.labels()?;
        let field = |key: &str| labels.get(key).cloned();
        Ok(
            match (field(LABEL_NAME), field(LABEL_VERSION), field(LABEL_RELEASE)) {
                (Some(name), Some(version), Some(release)) => ImageVersion::Known {
                    name,
                    version,
                    release,
                },
                _ => ImageVersion::Unavailable,
            },
        )
    }
}
