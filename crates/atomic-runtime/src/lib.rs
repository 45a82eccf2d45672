//! Lifecycle engine for label-driven application containers.
//!
//! The models here never spawn the container engine directly; they go
//! through [`backend::ContainerEngine`]:
//! - [`inspect`]: point-in-time inspection snapshots.
//! - [`image`]: label queries and pull-on-demand.
//! - [`container`]: state queries and start/stop/delete.
//! - [`lifecycle`]: run/install/uninstall/stop planning and command rendering.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod backend;
pub mod container;
pub mod exec;
pub mod host;
pub mod image;
pub mod inspect;
pub mod lifecycle;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
