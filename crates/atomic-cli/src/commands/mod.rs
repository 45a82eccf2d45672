//! CLI command definitions and dispatch.

pub mod host;
pub mod info;
pub mod install;
pub mod run;
pub mod status;
pub mod stop;
pub mod uninstall;
pub mod update;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use atomic_common::config::AtomicConfig;
use atomic_common::constants::APP_NAME;
use atomic_runtime::backend::{ContainerEngine, detect_engine};
use atomic_runtime::lifecycle::AtomicContainer;
use clap::{ArgAction, Parser, Subcommand};

/// atomic: install, run, and manage label-driven application containers.
#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON configuration file.
    #[arg(long, global = true, env = "ATOMIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the container engine client.
    #[arg(long, global = true, env = "ATOMIC_DOCKER")]
    pub docker: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the labels an image declares.
    Info(info::InfoArgs),
    /// Run the image's install command.
    Install(install::InstallArgs),
    /// Run the image's container, creating or reusing it as its labels dictate.
    Run(run::RunArgs),
    /// Stop a persistent application container.
    Stop(stop::StopArgs),
    /// Run the image's uninstall command and remove its container.
    Uninstall(uninstall::UninstallArgs),
    /// Pull the latest version of an image.
    Update(update::UpdateArgs),
    /// Print the image's Name-Version-Release.
    Version(version::VersionArgs),
    /// Show the state of an application container.
    Status(status::StatusArgs),
    /// Pass arguments through to the host update tool.
    Host(host::HostArgs),
}

/// Resolved configuration and engine shared by every command.
pub struct Context {
    /// Effective configuration.
    pub config: AtomicConfig,
    /// Engine the models talk to.
    pub engine: Arc<dyn ContainerEngine>,
}

impl Context {
    /// Builds the lifecycle engine for an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image or container cannot be inspected.
    pub fn application(
        &self,
        image: &str,
        name: Option<String>,
        spc: bool,
    ) -> anyhow::Result<AtomicContainer> {
        Ok(AtomicContainer::builder(image)
            .name(name)
            .spc(spc)
            .build(Arc::clone(&self.engine), self.config.clone())?)
    }
}

impl Cli {
    /// Loads the configuration and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn context(&self) -> anyhow::Result<Context> {
        let mut config = AtomicConfig::load_or_default(self.config.as_deref())?;
        if let Some(docker) = &self.docker {
            config.docker_path.clone_from(docker);
        }
        let engine = detect_engine(&config);
        Ok(Context { config, engine })
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let ctx = cli.context()?;
    if !matches!(cli.command, Command::Host(_)) && !ctx.engine.is_available() {
        tracing::warn!(
            path = %ctx.config.docker_path.display(),
            "container engine client not found"
        );
    }
    match cli.command {
        Command::Info(args) => info::execute(args, &ctx),
        Command::Install(args) => install::execute(args, &ctx),
        Command::Run(args) => run::execute(args, &ctx),
        Command::Stop(args) => stop::execute(args, &ctx),
        Command::Uninstall(args) => uninstall::execute(args, &ctx),
        Command::Update(args) => update::execute(args, &ctx),
        Command::Version(args) => version::execute(args, &ctx),
        Command::Status(args) => status::execute(args, &ctx),
        Command::Host(args) => host::execute(args, &ctx),
    }
}
