//! Point-in-time inspection snapshots of images and containers.
//!
//! An [`Inspection`] holds the engine's record for one named entity. The
//! record is replaced wholesale by [`Inspection::refresh`] and never edited
//! in place, so `exists()` and `raw()` always describe the same query.
//! Reads never refresh implicitly; callers refresh after any operation
//! expected to change what the engine reports.

use atomic_common::error::{AtomicError, Result};
use atomic_common::types::{EntityKind, Labels};
use serde_json::{Map, Value};

use crate::backend::ContainerEngine;

/// Cached inspection record of a single image or container.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    kind: EntityKind,
    name: String,
    record: Option<Value>,
}

impl Inspection {
    /// Inspects `name` immediately and returns the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails for a reason other than the
    /// entity not existing.
    pub fn new(engine: &dyn ContainerEngine, kind: EntityKind, name: impl Into<String>) -> Result<Self> {
        let mut inspection = Self {
            kind,
            name: name.into(),
            record: None,
        };
        inspection.refresh(engine)?;
        Ok(inspection)
    }

    /// Re-queries the engine and replaces the cached record.
    ///
    /// An entity that does not exist clears the record; that is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine invocation itself fails.
    pub fn refresh(&mut self, engine: &dyn ContainerEngine) -> Result<()> {
        self.record = engine.inspect(self.kind, &self.name)?;
        tracing::trace!(kind = %self.kind, name = %self.name, exists = self.record.is_some(), "refreshed");
        Ok(())
    }

    /// Name the entity is looked up by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of entity this snapshot describes.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Whether the entity existed at the last refresh.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.record.is_some()
    }

    /// The full inspection record, if the entity exists.
    #[must_use]
    pub const fn raw(&self) -> Option<&Value> {
        self.record.as_ref()
    }

    /// Looks up a nested field by JSON pointer (e.g. `/State/Running`).
    #[must_use]
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.record.as_ref().and_then(|r| r.pointer(pointer))
    }

    /// Engine-assigned id of the entity.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.field("/Id").and_then(Value::as_str)
    }

    /// The record's `Config` section.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entity does not exist, and
    /// `MissingConfiguration` if the record has no `Config` object.
    pub fn config(&self) -> Result<&Map<String, Value>> {
        let record = self.record.as_ref().ok_or_else(|| AtomicError::NotFound {
            kind: self.kind.as_str(),
            name: self.name.clone(),
        })?;
        record
            .get("Config")
            .and_then(Value::as_object)
            .ok_or_else(|| AtomicError::MissingConfiguration {
                key: "Config".into(),
            })
    }

    /// Labels from `Config.Labels`; a null or absent map yields no labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the record or its `Config` section is absent.
    pub fn labels(&self) -> Result<Labels> {
        let labels = match self.config()?.get("Labels") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect(),
            _ => Labels::new(),
        };
        Ok(labels)
    }
}
