//! In-memory container engine used by tests.
//!
//! `FakeEngine` records every call and emulates the state changes the
//! real engine would make: `run` templates create containers, `start`
//! and `stop` flip `State.Running`, `rm` refuses running containers
//! unless forced.

use std::collections::BTreeMap;
use std::sync::Mutex;

use atomic_common::error::{AtomicError, Result};
use atomic_common::types::{ContainerId, EntityKind};
use serde_json::{Value, json};

use crate::backend::ContainerEngine;

/// PID reported for containers started by the fake engine.
pub const FAKE_PID: u64 = 4242;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Call {
    Inspect { kind: EntityKind, name: String },
    Pull(String),
    Start(String),
    Stop(String),
    Remove { id: String, force: bool },
    List,
    Exec { container: String, command: Vec<String>, tty: bool },
    Spawn(Vec<String>),
}

impl Call {
    const fn is_inspect(&self) -> bool {
        matches!(self, Self::Inspect { .. })
    }
}

#[derive(Debug, Default)]
struct State {
    images: BTreeMap<String, Value>,
    registry: BTreeMap<String, Value>,
    containers: BTreeMap<String, Value>,
    calls: Vec<Call>,
    spawn_env: Vec<(String, String)>,
    inspect_failure: Option<String>,
    failing_execs: bool,
    next_id: u32,
}

impl State {
    fn container_key(&self, name_or_id: &str) -> Option<String> {
        if self.containers.contains_key(name_or_id) {
            return Some(name_or_id.to_string());
        }
        self.containers
            .iter()
            .find(|(_, record)| record["Id"] == name_or_id)
            .map(|(name, _)| name.clone())
    }

    fn engine_error(command: &str, output: &str) -> AtomicError {
        AtomicError::EngineInvocation {
            command: command.to_string(),
            status: Some(1),
            output: output.to_string(),
        }
    }
}

/// Recording, stateful stand-in for a container engine.
#[derive(Debug, Default)]
pub struct FakeEngine {
    state: Mutex<State>,
}

impl FakeEngine {
    /// Creates an engine with no images or containers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }

    /// Makes an image present locally.
    pub fn add_image(&self, name: &str, record: Value) {
        self.with(|s| {
            let _ = s.images.insert(name.to_string(), record);
        });
    }

    /// Removes a local image.
    pub fn remove_image(&self, name: &str) {
        self.with(|s| {
            let _ = s.images.remove(name);
        });
    }

    /// Makes an image pullable from the registry.
    pub fn publish(&self, name: &str, record: Value) {
        self.with(|s| {
            let _ = s.registry.insert(name.to_string(), record);
        });
    }

    /// Creates a container with the given record.
    pub fn add_container(&self, name: &str, record: Value) {
        self.with(|s| {
            let _ = s.containers.insert(name.to_string(), record);
        });
    }

    /// Makes every inspection fail as if the engine were unreachable.
    pub fn fail_inspect(&self, message: &str) {
        self.with(|s| s.inspect_failure = Some(message.to_string()));
    }

    /// Makes every `exec` exit non-zero.
    pub fn fail_execs(&self) {
        self.with(|s| s.failing_execs = true);
    }

    /// Returns the container record stored under `name`.
    pub fn container(&self, name: &str) -> Option<Value> {
        self.with(|s| s.containers.get(name).cloned())
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    /// Recorded calls excluding inspections.
    pub fn actions(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !c.is_inspect()).collect()
    }

    /// Forgets the recorded calls, keeping the emulated state.
    pub fn clear_calls(&self) {
        self.with(|s| s.calls.clear());
    }

    /// Environment passed to the most recent `spawn`.
    pub fn spawn_env(&self) -> Vec<(String, String)> {
        self.with(|s| s.spawn_env.clone())
    }
}

impl ContainerEngine for FakeEngine {
    fn inspect(&self, kind: EntityKind, name: &str) -> Result<Option<Value>> {
        self.with(|s| {
            s.calls.push(Call::Inspect {
                kind,
                name: name.to_string(),
            });
            if let Some(message) = &s.inspect_failure {
                return Err(State::engine_error("docker inspect", message));
            }
            Ok(match kind {
                EntityKind::Image => s.images.get(name).cloned(),
                EntityKind::Container => s
                    .container_key(name)
                    .and_then(|key| s.containers.get(&key).cloned()),
            })
        })
    }

    fn pull(&self, image: &str) -> Result<()> {
        self.with(|s| {
            s.calls.push(Call::Pull(image.to_string()));
            let record = s
                .registry
                .get(image)
                .cloned()
                .ok_or_else(|| State::engine_error("docker pull", "manifest unknown"))?;
            let _ = s.images.insert(image.to_string(), record);
            Ok(())
        })
    }

    fn start(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.calls.push(Call::Start(name.to_string()));
            let key = s
                .container_key(name)
                .ok_or_else(|| State::engine_error("docker start", "no such container"))?;
            if let Some(record) = s.containers.get_mut(&key) {
                record["State"]["Running"] = json!(true);
                record["State"]["Pid"] = json!(FAKE_PID);
            }
            Ok(())
        })
    }

    fn stop(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.calls.push(Call::Stop(name.to_string()));
            let key = s
                .container_key(name)
                .ok_or_else(|| State::engine_error("docker stop", "no such container"))?;
            if let Some(record) = s.containers.get_mut(&key) {
                record["State"]["Running"] = json!(false);
                record["State"]["Pid"] = json!(0);
            }
            Ok(())
        })
    }

    fn remove(&self, id: &str, force: bool) -> Result<()> {
        self.with(|s| {
            s.calls.push(Call::Remove {
                id: id.to_string(),
                force,
            });
            let key = s
                .container_key(id)
                .ok_or_else(|| State::engine_error("docker rm", "no such container"))?;
            let running = s.containers[&key]["State"]["Running"] == json!(true);
            if running && !force {
                return Err(State::engine_error(
                    "docker rm",
                    "You cannot remove a running container. Stop the container before attempting removal or force remove",
                ));
            }
            let _ = s.containers.remove(&key);
            Ok(())
        })
    }

    fn list_container_ids(&self) -> Result<Vec<ContainerId>> {
        self.with(|s| {
            s.calls.push(Call::List);
            Ok(s.containers
                .values()
                .filter_map(|r| r["Id"].as_str().map(ContainerId::new))
                .collect())
        })
    }

    fn exec(&self, container: &str, command: &[String], tty: bool) -> Result<()> {
        self.with(|s| {
            s.calls.push(Call::Exec {
                container: container.to_string(),
                command: command.to_vec(),
                tty,
            });
            if command.is_empty() {
                return Err(AtomicError::InvalidArgument {
                    message: "empty exec command".into(),
                });
            }
            let running = s
                .container_key(container)
                .is_some_and(|key| s.containers[&key]["State"]["Running"] == json!(true));
            if !running {
                return Err(State::engine_error("docker exec", "container is not running"));
            }
            if s.failing_execs {
                return Err(State::engine_error("docker exec", "command exited with 1"));
            }
            Ok(())
        })
    }

    fn spawn(&self, argv: &[String], env: &[(String, String)]) -> Result<()> {
        self.with(|s| {
            s.calls.push(Call::Spawn(argv.to_vec()));
            s.spawn_env = env.to_vec();
            if !argv.iter().any(|a| a == "run") {
                return Ok(());
            }
            let name = argv
                .iter()
                .position(|a| a == "--name")
                .and_then(|i| argv.get(i + 1))
                .cloned();
            if let Some(name) = &name {
                if s.containers.contains_key(name) {
                    return Err(State::engine_error(
                        "docker run",
                        "Conflict. The container name is already in use",
                    ));
                }
            }
            if argv.iter().any(|a| a == "--rm") {
                return Ok(());
            }
            let image_id = argv
                .iter()
                .find_map(|a| s.images.get(a.as_str()))
                .and_then(|r| r["Id"].as_str())
                .unwrap_or_default()
                .to_string();
            s.next_id += 1;
            let id = format!("c{:063}", s.next_id);
            let detached = argv.iter().any(|a| a == "-d");
            let name = name.unwrap_or_else(|| id.clone());
            let _ = s
                .containers
                .insert(name, container_record(&id, &image_id, detached));
            Ok(())
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Builds an image inspection record.
pub fn image_record(id: &str, labels: &[(&str, &str)], cmd: Option<&[&str]>) -> Value {
    let labels: serde_json::Map<String, Value> = labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), json!(v)))
        .collect();
    json!({
        "Id": id,
        "Config": {
            "Labels": labels,
            "Cmd": cmd,
        },
    })
}

/// Builds a container inspection record.
pub fn container_record(id: &str, image_id: &str, running: bool) -> Value {
    json!({
        "Id": id,
        "Image": image_id,
        "Config": {
            "AttachStdin": false,
            "AttachStdout": true,
            "AttachStderr": true,
            "Labels": null,
        },
        "State": {
            "Running": running,
            "Pid": if running { FAKE_PID } else { 0 },
        },
        "NetworkSettings": {
            "IPAddress": if running { "172.17.0.2" } else { "" },
        },
    })
}

/// Converts string slices into an owned command.
pub fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}
