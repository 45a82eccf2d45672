//! `atomic uninstall`: Run the image's uninstall command and remove its container.

use anyhow::bail;
use clap::Args;

use super::Context;

/// Arguments for the `uninstall` command.
#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Container name (defaults to the image's base name).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Keep the container after uninstalling.
    #[arg(short, long)]
    pub keep: bool,

    /// Uninstall with host privileges, namespaces and filesystem.
    #[arg(short, long)]
    pub spc: bool,

    /// Image reference.
    pub image: String,
}

/// Executes the `uninstall` command.
///
/// # Errors
///
/// Returns an error if a persistent image has no container to uninstall, or
/// if uninstalling or removing the container fails.
pub fn execute(args: UninstallArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.application(&args.image, args.name, args.spc)?;
    if app.persistent() && !app.container().exists() {
        bail!(
            "container {} does not exist; nothing to uninstall",
            app.name()
        );
    }
    app.uninstall()?;
    if !args.keep && app.container().exists() {
        tracing::info!(name = %app.name(), "removing leftover container");
        app.delete(true)?;
    }
    Ok(())
}
