//! Lifecycle engine for label-driven application containers.
//!
//! [`AtomicContainer`] pairs an [`Image`] with the [`Container`] identity
//! derived from it and decides, from the image's labels and the container's
//! freshly inspected state, how to run, install, uninstall, or stop it.
//!
//! Run-style invocations go through a single state machine:
//!
//! | policy     | absent           | stopped        | running |
//! |------------|------------------|----------------|---------|
//! | persistent | create detached  | start          | reuse   |
//! | ephemeral  | create attached  | delete, create | delete, create |
//!
//! Persistent invocations then `exec` the explicit command, if any, inside
//! the container. Install and uninstall exec their script inside the
//! persistent container the same way, and never delete an existing one.

use std::sync::Arc;

use atomic_common::config::AtomicConfig;
use atomic_common::constants::{
    DOCKER_PROGRAM, ENV_CONFDIR, ENV_DATADIR, ENV_HOST, ENV_IMAGE, ENV_LOGDIR, ENV_NAME, ENV_SPC,
    LABEL_INSTALL, LABEL_PERSISTENT, LABEL_RUN, LABEL_STOP, LABEL_UNINSTALL, PLACEHOLDER_IMAGE,
    PLACEHOLDER_IMAGE_ID, PLACEHOLDER_NAME,
};
use atomic_common::error::{AtomicError, Result};
use atomic_common::types::ContainerState;

use crate::backend::ContainerEngine;
use crate::container::Container;
use crate::image::Image;

/// Lifecycle operations whose command an image may override with a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create and run the application container.
    Run,
    /// Install the application onto the host.
    Install,
    /// Remove the application from the host.
    Uninstall,
    /// Graceful shutdown hook run inside the container.
    Stop,
}

impl Action {
    /// Label key that overrides this action's command.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Run => LABEL_RUN,
            Self::Install => LABEL_INSTALL,
            Self::Uninstall => LABEL_UNINSTALL,
            Self::Stop => LABEL_STOP,
        }
    }

    /// Whether SPC mode ignores the label and forces the built-in template.
    const fn spc_forces_builtin(self) -> bool {
        matches!(self, Self::Run | Self::Install)
    }
}

/// Origin of a resolved command template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// Built from the engine's defaults (and the SPC preset, if enabled).
    Builtin,
    /// Taken verbatim from an image label.
    Label,
}

/// A rendered command line and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Origin of the template.
    pub source: TemplateSource,
    /// Fully rendered argument vector, program first.
    pub argv: Vec<String>,
}

/// Step the state machine takes for a given policy and observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Create a long-lived detached container.
    CreateDetached,
    /// Start the existing stopped container.
    Start,
    /// Use the running container as is.
    Reuse,
    /// Create a fresh attached container, deleting a stale one first when
    /// `replace` is set.
    CreateAttached {
        /// Whether a container with the same name must be deleted first.
        replace: bool,
    },
}

/// Derives the next step from the persistence policy and observed state.
#[must_use]
pub const fn plan(persistent: bool, state: ContainerState) -> Plan {
    match (persistent, state) {
        (true, ContainerState::Absent) => Plan::CreateDetached,
        (true, ContainerState::Stopped) => Plan::Start,
        (true, ContainerState::Running) => Plan::Reuse,
        (false, ContainerState::Absent) => Plan::CreateAttached { replace: false },
        (false, _) => Plan::CreateAttached { replace: true },
    }
}

/// Observable status of an application container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Image reference.
    pub image: String,
    /// Container name.
    pub name: String,
    /// Whether the container exists.
    pub exists: bool,
    /// Whether the container is running.
    pub running: bool,
    /// PID of the container's init process.
    pub pid: Option<u32>,
    /// Container IP address.
    pub address: Option<String>,
}

/// One pass through the run state machine.
#[derive(Debug)]
struct Invocation {
    template: Template,
    command: Option<Vec<String>>,
}

/// Builder for [`AtomicContainer`].
#[derive(Debug, Clone)]
pub struct AtomicContainerBuilder {
    image: String,
    name: Option<String>,
    spc: bool,
    tty: Option<bool>,
}

impl AtomicContainerBuilder {
    /// Creates a builder for the given image reference.
    #[must_use]
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: None,
            spc: false,
            tty: None,
        }
    }

    /// Overrides the container name derived from the image.
    #[must_use]
    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Enables super-privileged (SPC) mode.
    #[must_use]
    pub const fn spc(mut self, spc: bool) -> Self {
        self.spc = spc;
        self
    }

    /// Overrides terminal detection for the invoking process.
    #[must_use]
    pub const fn tty(mut self, tty: bool) -> Self {
        self.tty = Some(tty);
        self
    }

    /// Inspects the image and container and returns the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the container engine cannot be queried.
    pub fn build(
        self,
        engine: Arc<dyn ContainerEngine>,
        config: AtomicConfig,
    ) -> Result<AtomicContainer> {
        let image = Image::new(Arc::clone(&engine), &config, &self.image)?;
        let name = self.name.unwrap_or_else(|| {
            let base = image.default_container_name();
            if self.spc { format!("{base}-spc") } else { base }
        });
        let container = Container::new(Arc::clone(&engine), &name)?;
        Ok(AtomicContainer {
            engine,
            config,
            image,
            container,
            spc: self.spc,
            tty: self.tty.unwrap_or_else(crate::exec::stdin_is_terminal),
        })
    }
}

/// Label-driven lifecycle engine for one image and its container.
pub struct AtomicContainer {
    engine: Arc<dyn ContainerEngine>,
    config: AtomicConfig,
    image: Image,
    container: Container,
    spc: bool,
    tty: bool,
}

impl std::fmt::Debug for AtomicContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicContainer")
            .field("image", &self.image)
            .field("container", &self.container)
            .field("spc", &self.spc)
            .field("tty", &self.tty)
            .finish_non_exhaustive()
    }
}

impl AtomicContainer {
    /// Starts building an engine for the given image reference.
    #[must_use]
    pub fn builder(image: impl Into<String>) -> AtomicContainerBuilder {
        AtomicContainerBuilder::new(image)
    }

    /// The image this container is created from.
    #[must_use]
    pub const fn image(&self) -> &Image {
        &self.image
    }

    /// The container identity.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.container.name()
    }

    /// Whether SPC mode is enabled.
    #[must_use]
    pub const fn spc(&self) -> bool {
        self.spc
    }

    /// Whether the container is meant to survive across invocations.
    #[must_use]
    pub fn persistent(&self) -> bool {
        self.image.boolean_label(LABEL_PERSISTENT)
    }

    /// Environment exported to spawned template commands.
    #[must_use]
    pub fn environ(&self) -> Vec<(String, String)> {
        let name = self.name();
        vec![
            (ENV_CONFDIR.to_string(), format!("/etc/{name}")),
            (ENV_LOGDIR.to_string(), format!("/var/log/{name}")),
            (ENV_DATADIR.to_string(), format!("/var/lib/{name}")),
        ]
    }

    /// Current status as last inspected.
    #[must_use]
    pub fn status(&self) -> Status {
        Status {
            image: self.image.name().to_string(),
            name: self.name().to_string(),
            exists: self.container.exists(),
            running: self.container.running(),
            pid: self.container.pid(),
            address: self.container.address(),
        }
    }

    /// Substitutes `{name}`, `{image}` and `{image_id}` in one argument.
    fn render_arg(&self, arg: &str) -> Result<String> {
        let mut rendered = arg
            .replace(PLACEHOLDER_NAME, self.name())
            .replace(PLACEHOLDER_IMAGE, self.image.name());
        if rendered.contains(PLACEHOLDER_IMAGE_ID) {
            let id = self.image.id().ok_or_else(|| AtomicError::MissingConfiguration {
                key: format!("{} Id", self.image.name()),
            })?;
            rendered = rendered.replace(PLACEHOLDER_IMAGE_ID, id.as_str());
        }
        Ok(rendered)
    }

    fn render(&self, args: &[String]) -> Result<Vec<String>> {
        args.iter().map(|arg| self.render_arg(arg)).collect()
    }

    /// Builds the built-in `run` command line.
    ///
    /// `oneshot` requests a remove-on-exit container even for persistent
    /// images. The SPC preset is always applied in SPC mode.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder cannot be rendered.
    pub fn build_run_command(&self, oneshot: bool) -> Result<Vec<String>> {
        let mut args: Vec<String> = [
            DOCKER_PROGRAM,
            "run",
            "--name",
            PLACEHOLDER_NAME,
            "-v",
            "/etc/localtime:/etc/localtime",
            "-e",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        args.push(format!("{ENV_NAME}={PLACEHOLDER_NAME}"));
        args.push("-e".to_string());
        args.push(format!("{ENV_IMAGE}={PLACEHOLDER_IMAGE}"));

        if self.persistent() && !oneshot {
            args.push("-d".to_string());
        } else {
            args.push("--rm".to_string());
            args.push("-i".to_string());
            if self.tty {
                args.push("-t".to_string());
            }
        }

        if self.spc {
            let host_root = &self.config.host_root;
            args.extend(
                [
                    "--privileged".to_string(),
                    "--net=host".to_string(),
                    "--ipc=host".to_string(),
                    "--pid=host".to_string(),
                    "-e".to_string(),
                    format!("{ENV_SPC}=1"),
                    "-e".to_string(),
                    format!("{ENV_HOST}={host_root}"),
                    "-v".to_string(),
                    format!("/:{host_root}"),
                    "-v".to_string(),
                    "/run:/run".to_string(),
                ],
            );
        }

        args.push(PLACEHOLDER_IMAGE.to_string());
        self.render(&args)
    }

    /// Resolves the command template for an action.
    ///
    /// SPC mode forces the built-in template for run and install. Otherwise
    /// a label overrides the built-in. Stop has no built-in and resolves
    /// to `None` without a label.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLabel` if a label is not valid shell words, or an
    /// error if a placeholder cannot be rendered.
    pub fn template(&self, action: Action) -> Result<Option<Template>> {
        if !(self.spc && action.spc_forces_builtin()) {
            if let Some(value) = self.image.label(action.label()) {
                let words = shlex::split(&value)
                    .filter(|words| !words.is_empty())
                    .ok_or_else(|| AtomicError::InvalidLabel {
                        key: action.label().to_string(),
                        value: value.clone(),
                    })?;
                return Ok(Some(Template {
                    source: TemplateSource::Label,
                    argv: self.render(&words)?,
                }));
            }
        }

        let builtin = match action {
            Action::Run => Some(self.build_run_command(false)?),
            Action::Install | Action::Uninstall => Some(self.build_run_command(true)?),
            Action::Stop => None,
        };
        Ok(builtin.map(|argv| Template {
            source: TemplateSource::Builtin,
            argv,
        }))
    }

    fn required_template(&self, action: Action) -> Result<Template> {
        self.template(action)?
            .ok_or_else(|| AtomicError::MissingConfiguration {
                key: action.label().to_string(),
            })
    }

    /// Runs the application container.
    ///
    /// Persistent images get a detached container that is created or
    /// started as needed, with `command` executed inside it. Ephemeral
    /// images get a fresh attached container running `command`, or the
    /// image's declared command when none is given.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an explicitly empty command, and
    /// propagates any engine failure.
    pub fn run(&mut self, command: Option<Vec<String>>) -> Result<()> {
        if command.as_ref().is_some_and(Vec::is_empty) {
            return Err(AtomicError::InvalidArgument {
                message: format!("empty command for container {}", self.name()),
            });
        }
        self.image.pull_if_missing()?;
        let template = self.required_template(Action::Run)?;
        self.execute(Invocation { template, command })
    }

    /// Runs the image's install command.
    ///
    /// Persistent images run the install script inside their container,
    /// creating or starting it first. Ephemeral images run it in a
    /// remove-on-exit container.
    ///
    /// # Errors
    ///
    /// Propagates pull, label, and engine failures.
    pub fn install(&mut self) -> Result<()> {
        tracing::info!(container = %self.name(), "installing container");
        let command = self.config.install_command.clone();
        self.run_script(Action::Install, command)
    }

    /// Runs the image's uninstall command, the same way as [`Self::install`].
    ///
    /// # Errors
    ///
    /// Propagates pull, label, and engine failures.
    pub fn uninstall(&mut self) -> Result<()> {
        tracing::info!(container = %self.name(), "uninstalling container");
        let command = self.config.uninstall_command.clone();
        self.run_script(Action::Uninstall, command)
    }

    /// Label templates are complete command lines and are spawned as
    /// given. Built-in templates run the in-container script: persistent
    /// images exec it in their (created or started) container, ephemeral
    /// ones in a remove-on-exit container. Existing containers are never
    /// deleted here.
    fn run_script(&mut self, action: Action, script: Vec<String>) -> Result<()> {
        self.image.pull_if_missing()?;
        self.container.refresh()?;
        let template = self.required_template(action)?;

        if template.source == TemplateSource::Label {
            self.engine.spawn(&template.argv, &self.environ())?;
            return self.container.refresh();
        }
        if self.persistent() {
            let template = self.required_template(Action::Run)?;
            return self.execute(Invocation {
                template,
                command: Some(script),
            });
        }

        let mut argv = template.argv;
        argv.extend(script);
        self.engine.spawn(&argv, &self.environ())?;
        self.container.refresh()
    }

    fn execute(&mut self, invocation: Invocation) -> Result<()> {
        self.container.refresh()?;
        let step = plan(self.persistent(), self.container.state());
        tracing::debug!(container = %self.name(), ?step, "planned run");

        let Invocation { template, command } = invocation;

        match step {
            Plan::CreateDetached => {
                tracing::info!(container = %self.name(), "creating persistent container");
                self.engine.spawn(&template.argv, &self.environ())?;
                self.container.refresh()?;
            }
            Plan::Start => self.container.start()?,
            Plan::Reuse => {
                tracing::debug!(container = %self.name(), "container already running");
            }
            Plan::CreateAttached { replace } => {
                if replace {
                    self.container.delete(false)?;
                }
                let mut argv = template.argv;
                argv.extend(command.unwrap_or_else(|| self.image.command()));
                self.engine.spawn(&argv, &self.environ())?;
                return self.container.refresh();
            }
        }

        match command {
            Some(command) => self.engine.exec(self.name(), &command, self.tty),
            None => Ok(()),
        }
    }

    /// Stops a persistent container, running the image's stop hook first.
    ///
    /// Stopping a container that is not running, or an ephemeral one, is
    /// refused with a warning and issues no engine call.
    ///
    /// # Errors
    ///
    /// Propagates inspection and engine stop failures. A failing stop hook
    /// is only logged.
    pub fn stop(&mut self) -> Result<()> {
        self.container.refresh()?;
        if !self.container.running() {
            tracing::warn!(container = %self.name(), "container is not running");
            return Ok(());
        }
        if !self.persistent() {
            tracing::warn!(
                container = %self.name(),
                "container is not persistent; it is removed when its command exits"
            );
            return Ok(());
        }
        if let Some(hook) = self.template(Action::Stop)? {
            if let Err(e) = self.engine.exec(self.name(), &hook.argv, false) {
                tracing::warn!(container = %self.name(), error = %e, "stop hook failed");
            }
        }
        self.container.stop()
    }

    /// Deletes the container.
    ///
    /// # Errors
    ///
    /// Propagates engine removal failures.
    pub fn delete(&mut self, force: bool) -> Result<()> {
        self.container.delete(force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeEngine, cmd, container_record, image_record};

    const PERSISTENT: (&str, &str) = (LABEL_PERSISTENT, "true");

    fn engine_with_image(name: &str, labels: &[(&str, &str)]) -> Arc<FakeEngine> {
        let engine = Arc::new(FakeEngine::new());
        engine.add_image(name, image_record("sha256:img", labels, Some(&["/usr/bin/app"])));
        engine
    }

    fn atomic(engine: &Arc<FakeEngine>, image: &str, spc: bool) -> AtomicContainer {
        AtomicContainer::builder(image)
            .spc(spc)
            .tty(false)
            .build(Arc::clone(engine) as Arc<dyn ContainerEngine>, AtomicConfig::default())
            .expect("build")
    }

    fn base_args(name: &str, image: &str) -> Vec<String> {
        let mut args = cmd(&[
            "docker",
            "run",
            "--name",
            name,
            "-v",
            "/etc/localtime:/etc/localtime",
            "-e",
        ]);
        args.push(format!("ATOMIC_NAME={name}"));
        args.push("-e".to_string());
        args.push(format!("ATOMIC_IMAGE={image}"));
        args
    }

    fn spawns(engine: &FakeEngine) -> Vec<Vec<String>> {
        engine
            .actions()
            .into_iter()
            .filter_map(|c| match c {
                Call::Spawn(argv) => Some(argv),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plan_covers_every_state() {
        assert_eq!(plan(true, ContainerState::Absent), Plan::CreateDetached);
        assert_eq!(plan(true, ContainerState::Stopped), Plan::Start);
        assert_eq!(plan(true, ContainerState::Running), Plan::Reuse);
        assert_eq!(
            plan(false, ContainerState::Absent),
            Plan::CreateAttached { replace: false }
        );
        assert_eq!(
            plan(false, ContainerState::Stopped),
            Plan::CreateAttached { replace: true }
        );
        assert_eq!(
            plan(false, ContainerState::Running),
            Plan::CreateAttached { replace: true }
        );
    }

    #[test]
    fn persistent_absent_run_creates_one_detached_container() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.run(None).expect("run");

        let actions = engine.actions();
        assert_eq!(actions.len(), 1);
        let Call::Spawn(argv) = &actions[0] else {
            panic!("expected a create, got {actions:?}");
        };
        assert!(argv.contains(&"-d".to_string()));
        assert!(!argv.contains(&"--rm".to_string()));
        assert!(app.container().running());
    }

    #[test]
    fn persistent_running_run_with_command_only_execs() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", true));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.run(Some(cmd(&["ls", "/srv"]))).expect("run");

        assert_eq!(
            engine.actions(),
            vec![Call::Exec {
                container: "web".into(),
                command: cmd(&["ls", "/srv"]),
                tty: false,
            }]
        );
    }

    #[test]
    fn persistent_stopped_run_starts_then_execs() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", false));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.run(Some(cmd(&["sh"]))).expect("run");

        assert_eq!(
            engine.actions(),
            vec![
                Call::Start("web".into()),
                Call::Exec {
                    container: "web".into(),
                    command: cmd(&["sh"]),
                    tty: false,
                },
            ]
        );
    }

    #[test]
    fn persistent_running_run_without_command_does_nothing() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", true));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.run(None).expect("run");
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn persistent_absent_run_with_command_creates_then_execs() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.run(Some(cmd(&["status"]))).expect("run");

        let actions = engine.actions();
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], Call::Spawn(argv) if !argv.contains(&"status".to_string())));
        assert!(matches!(&actions[1], Call::Exec { command, .. } if *command == cmd(&["status"])));
    }

    #[test]
    fn ephemeral_run_deletes_stale_stopped_container_first() {
        let engine = engine_with_image("tool", &[]);
        engine.add_container("tool", container_record("c-stale", "sha256:img", false));
        let mut app = atomic(&engine, "tool", false);
        engine.clear_calls();

        app.run(None).expect("run");

        let actions = engine.actions();
        assert_eq!(
            actions[0],
            Call::Remove {
                id: "c-stale".into(),
                force: false
            }
        );
        assert!(matches!(&actions[1], Call::Spawn(_)));
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn ephemeral_run_with_running_container_propagates_engine_refusal() {
        let engine = engine_with_image("tool", &[]);
        engine.add_container("tool", container_record("c-live", "sha256:img", true));
        let mut app = atomic(&engine, "tool", false);
        engine.clear_calls();

        let err = app.run(None).expect_err("should fail");
        assert!(matches!(err, AtomicError::EngineInvocation { .. }));
        assert!(spawns(&engine).is_empty());
    }

    #[test]
    fn ephemeral_run_appends_image_command_by_default() {
        let engine = engine_with_image("tool", &[]);
        let mut app = atomic(&engine, "tool", false);
        engine.clear_calls();

        app.run(None).expect("run");
        let argv = &spawns(&engine)[0];
        assert_eq!(argv.last().map(String::as_str), Some("/usr/bin/app"));
    }

    #[test]
    fn ephemeral_run_scenario_issues_exact_command() {
        let engine = engine_with_image("myapp:latest", &[]);
        let mut app = atomic(&engine, "myapp:latest", false);

        app.run(Some(cmd(&["/bin/echo", "hi"]))).expect("run");

        let calls = engine.calls();
        assert!(calls.contains(&Call::Inspect {
            kind: atomic_common::types::EntityKind::Container,
            name: "myapp".into(),
        }));
        let mut expected = base_args("myapp", "myapp:latest");
        expected.extend(cmd(&["--rm", "-i", "myapp:latest", "/bin/echo", "hi"]));
        assert_eq!(engine.actions(), vec![Call::Spawn(expected)]);
    }

    #[test]
    fn ephemeral_run_with_terminal_adds_tty_flag() {
        let engine = engine_with_image("myapp:latest", &[]);
        let mut app = AtomicContainer::builder("myapp:latest")
            .tty(true)
            .build(Arc::clone(&engine) as Arc<dyn ContainerEngine>, AtomicConfig::default())
            .expect("build");

        app.run(Some(cmd(&["/bin/echo", "hi"]))).expect("run");

        let mut expected = base_args("myapp", "myapp:latest");
        expected.extend(cmd(&["--rm", "-i", "-t", "myapp:latest", "/bin/echo", "hi"]));
        assert_eq!(spawns(&engine), vec![expected]);
    }

    #[test]
    fn run_pulls_missing_image_first() {
        let engine = Arc::new(FakeEngine::new());
        engine.publish("tool", image_record("sha256:img", &[], None));
        let mut app = atomic(&engine, "tool", false);
        engine.clear_calls();

        app.run(None).expect("run");
        let actions = engine.actions();
        assert_eq!(actions[0], Call::Pull("tool".into()));
        assert!(matches!(&actions[1], Call::Spawn(argv) if argv.last().map(String::as_str) == Some("/bin/sh")));
    }

    #[test]
    fn run_rejects_explicitly_empty_command() {
        let engine = engine_with_image("tool", &[]);
        let mut app = atomic(&engine, "tool", false);
        let err = app.run(Some(Vec::new())).expect_err("should fail");
        assert!(matches!(err, AtomicError::InvalidArgument { .. }));
    }

    #[test]
    fn run_exports_directories_to_spawned_command() {
        let engine = engine_with_image("tool", &[]);
        let mut app = atomic(&engine, "tool", false);
        app.run(None).expect("run");
        let env = engine.spawn_env();
        assert!(env.contains(&("ATOMIC_CONFDIR".into(), "/etc/tool".into())));
        assert!(env.contains(&("ATOMIC_LOGDIR".into(), "/var/log/tool".into())));
        assert!(env.contains(&("ATOMIC_DATADIR".into(), "/var/lib/tool".into())));
    }

    #[test]
    fn ephemeral_build_removes_on_exit_and_never_detaches() {
        let engine = engine_with_image("tool", &[]);
        let app = atomic(&engine, "tool", false);
        let argv = app.build_run_command(false).expect("argv");
        assert!(argv.contains(&"--rm".to_string()));
        assert!(!argv.contains(&"-d".to_string()));
        assert!(!argv.contains(&"--privileged".to_string()));
    }

    #[test]
    fn persistent_oneshot_build_removes_on_exit() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        let app = atomic(&engine, "web", false);
        assert!(app.build_run_command(false).expect("argv").contains(&"-d".to_string()));
        let oneshot = app.build_run_command(true).expect("argv");
        assert!(oneshot.contains(&"--rm".to_string()));
        assert!(!oneshot.contains(&"-d".to_string()));
    }

    #[test]
    fn spc_ignores_run_label_and_applies_privileged_preset() {
        let engine = engine_with_image(
            "tools",
            &[(LABEL_RUN, "docker run --name {name} --cap-drop=ALL {image}")],
        );
        let app = atomic(&engine, "tools", true);

        let template = app.template(Action::Run).expect("template").expect("run template");
        assert_eq!(template.source, TemplateSource::Builtin);
        for flag in [
            "--privileged",
            "--net=host",
            "--ipc=host",
            "--pid=host",
            "ATOMIC_SPC=1",
            "ATOMIC_HOST=/host",
            "/:/host",
            "/run:/run",
        ] {
            assert!(template.argv.contains(&flag.to_string()), "missing {flag}");
        }
        assert!(!template.argv.contains(&"--cap-drop=ALL".to_string()));
    }

    #[test]
    fn spc_derives_suffixed_name_unless_explicit() {
        let engine = engine_with_image("tools", &[]);
        assert_eq!(atomic(&engine, "tools", true).name(), "tools-spc");

        let named = AtomicContainer::builder("tools")
            .name(Some("custom".into()))
            .spc(true)
            .tty(false)
            .build(Arc::clone(&engine) as Arc<dyn ContainerEngine>, AtomicConfig::default())
            .expect("build");
        assert_eq!(named.name(), "custom");
    }

    #[test]
    fn run_label_overrides_builtin_and_renders_placeholders() {
        let engine = engine_with_image(
            "registry.local/web:1",
            &[(LABEL_RUN, "docker run --name '{name}' -l id={image_id} {image}")],
        );
        let mut app = atomic(&engine, "registry.local/web:1", false);
        engine.clear_calls();

        app.run(Some(cmd(&["serve"]))).expect("run");

        assert_eq!(
            spawns(&engine),
            vec![cmd(&[
                "docker",
                "run",
                "--name",
                "web",
                "-l",
                "id=sha256:img",
                "registry.local/web:1",
                "serve",
            ])]
        );
    }

    #[test]
    fn unparseable_label_is_invalid() {
        let engine = engine_with_image("web", &[(LABEL_RUN, "docker run 'unterminated")]);
        let app = atomic(&engine, "web", false);
        let err = app.template(Action::Run).expect_err("should fail");
        assert!(matches!(err, AtomicError::InvalidLabel { .. }));
    }

    #[test]
    fn stop_template_absent_without_label() {
        let engine = engine_with_image("web", &[]);
        let app = atomic(&engine, "web", false);
        assert!(app.template(Action::Stop).expect("template").is_none());
    }

    fn script_exec(script: &str) -> Call {
        Call::Exec {
            container: "web".into(),
            command: cmd(&[script]),
            tty: false,
        }
    }

    #[test]
    fn persistent_install_creates_container_then_execs_script() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.install().expect("install");

        let mut detached = base_args("web", "web");
        detached.extend(cmd(&["-d", "web"]));
        assert_eq!(
            engine.actions(),
            vec![Call::Spawn(detached), script_exec("/usr/bin/install.sh")]
        );
        assert!(app.container().running());
    }

    #[test]
    fn persistent_install_starts_stopped_container_instead_of_deleting_it() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", false));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.install().expect("install");

        assert_eq!(
            engine.actions(),
            vec![Call::Start("web".into()), script_exec("/usr/bin/install.sh")]
        );
        assert!(app.container().exists());
        assert_eq!(engine.container("web").expect("kept")["Id"], "c1");
    }

    #[test]
    fn persistent_install_on_running_container_only_execs() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", true));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.install().expect("install");

        assert_eq!(engine.actions(), vec![script_exec("/usr/bin/install.sh")]);
    }

    #[test]
    fn ephemeral_install_runs_script_in_remove_on_exit_container() {
        let engine = engine_with_image("web", &[]);
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.install().expect("install");

        let mut expected = base_args("web", "web");
        expected.extend(cmd(&["--rm", "-i", "web", "/usr/bin/install.sh"]));
        assert_eq!(engine.actions(), vec![Call::Spawn(expected)]);
        assert!(!app.container().exists());
    }

    #[test]
    fn install_label_is_run_verbatim() {
        let engine = engine_with_image(
            "web",
            &[(LABEL_INSTALL, "docker run --rm -v /etc:/host/etc {image} /setup.sh {name}")],
        );
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.install().expect("install");

        assert_eq!(
            spawns(&engine),
            vec![cmd(&[
                "docker", "run", "--rm", "-v", "/etc:/host/etc", "web", "/setup.sh", "web",
            ])]
        );
    }

    #[test]
    fn spc_install_ignores_install_label() {
        let engine = engine_with_image("tools", &[(LABEL_INSTALL, "docker run {image} /evil.sh")]);
        let mut app = atomic(&engine, "tools", true);
        engine.clear_calls();

        app.install().expect("install");

        let argv = &spawns(&engine)[0];
        assert!(argv.contains(&"--privileged".to_string()));
        assert!(!argv.contains(&"/evil.sh".to_string()));
        assert_eq!(argv.last().map(String::as_str), Some("/usr/bin/install.sh"));
    }

    #[test]
    fn spc_uninstall_honors_uninstall_label() {
        let engine = engine_with_image(
            "tools",
            &[(LABEL_UNINSTALL, "docker run --rm {image} /cleanup.sh")],
        );
        let mut app = atomic(&engine, "tools", true);
        engine.clear_calls();

        app.uninstall().expect("uninstall");
        assert_eq!(
            spawns(&engine),
            vec![cmd(&["docker", "run", "--rm", "tools", "/cleanup.sh"])]
        );
    }

    #[test]
    fn persistent_uninstall_keeps_stopped_container() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", false));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.uninstall().expect("uninstall");

        assert_eq!(
            engine.actions(),
            vec![Call::Start("web".into()), script_exec("/usr/bin/uninstall.sh")]
        );
        assert!(app.container().exists());
    }

    #[test]
    fn ephemeral_uninstall_never_deletes_existing_container() {
        let engine = engine_with_image("web", &[]);
        engine.add_container("web", container_record("c-old", "sha256:img", false));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        assert!(app.uninstall().is_err());
        assert!(
            !engine
                .actions()
                .iter()
                .any(|c| matches!(c, Call::Remove { .. }))
        );
        assert!(app.container().exists());
    }

    #[test]
    fn stop_on_ephemeral_container_makes_no_engine_call() {
        let engine = engine_with_image("tool", &[]);
        engine.add_container("tool", container_record("c1", "sha256:img", true));
        let mut app = atomic(&engine, "tool", false);
        engine.clear_calls();

        app.stop().expect("stop");
        assert!(engine.actions().is_empty());
        assert!(app.container().running());
    }

    #[test]
    fn stop_on_stopped_container_makes_no_engine_call() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", false));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.stop().expect("stop");
        assert!(engine.actions().is_empty());
    }

    #[test]
    fn stop_runs_hook_before_engine_stop() {
        let engine = engine_with_image(
            "web",
            &[PERSISTENT, (LABEL_STOP, "/usr/sbin/apachectl -k graceful-stop")],
        );
        engine.add_container("web", container_record("c1", "sha256:img", true));
        let mut app = atomic(&engine, "web", false);
        engine.clear_calls();

        app.stop().expect("stop");

        assert_eq!(
            engine.actions(),
            vec![
                Call::Exec {
                    container: "web".into(),
                    command: cmd(&["/usr/sbin/apachectl", "-k", "graceful-stop"]),
                    tty: false,
                },
                Call::Stop("web".into()),
            ]
        );
        assert!(!app.container().running());
    }

    #[test]
    fn failing_stop_hook_still_stops_container() {
        let engine = engine_with_image("web", &[PERSISTENT, (LABEL_STOP, "/bin/false")]);
        engine.add_container("web", container_record("c1", "sha256:img", true));
        engine.fail_execs();
        let mut app = atomic(&engine, "web", false);

        app.stop().expect("stop");
        assert!(!app.container().running());
    }

    #[test]
    fn status_reflects_container() {
        let engine = engine_with_image("web", &[PERSISTENT]);
        engine.add_container("web", container_record("c1", "sha256:img", true));
        let app = atomic(&engine, "web", false);
        let status = app.status();
        assert!(status.exists);
        assert!(status.running);
        assert_eq!(status.pid, Some(4242));
        assert_eq!(status.address.as_deref(), Some("172.17.0.2"));
        assert_eq!(status.name, "web");
    }
}
