//! `atomic install`: Run the image's install command.

use clap::Args;

use super::Context;

/// Arguments for the `install` command.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Container name (defaults to the image's base name).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Force-delete an existing container before installing.
    #[arg(short, long)]
    pub replace: bool,

    /// Install with host privileges, namespaces and filesystem.
    #[arg(short, long)]
    pub spc: bool,

    /// Image reference.
    pub image: String,
}

/// Executes the `install` command.
///
/// # Errors
///
/// Returns an error if the existing container cannot be removed or the
/// install invocation fails.
pub fn execute(args: InstallArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.application(&args.image, args.name, args.spc)?;
    if args.replace && app.container().exists() {
        app.delete(true)?;
    }
    app.install()?;
    Ok(())
}
