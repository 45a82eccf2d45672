//! `atomic stop`: Stop a persistent application container.

use clap::Args;

use super::Context;

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Container name (defaults to the image's base name).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Address the SPC-mode container.
    #[arg(short, long)]
    pub spc: bool,

    /// Image reference.
    pub image: String,
}

/// Executes the `stop` command.
///
/// # Errors
///
/// Returns an error if the engine fails to stop the container.
pub fn execute(args: StopArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.application(&args.image, args.name, args.spc)?;
    app.stop()?;
    Ok(())
}
