//! `atomic run`: Run the image's container.

use clap::Args;

use super::Context;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Container name (defaults to the image's base name).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Run with host privileges, namespaces and filesystem.
    #[arg(short, long)]
    pub spc: bool,

    /// Image reference.
    pub image: String,

    /// Command to run instead of the image's default.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if the image cannot be pulled or the engine refuses a
/// step of the run.
pub fn execute(args: RunArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut app = ctx.application(&args.image, args.name, args.spc)?;
    let command = (!args.command.is_empty()).then_some(args.command);
    app.run(command)?;
    Ok(())
}
