//! `atomic status`: Show the state of an application container.

use clap::Args;

use super::Context;
use crate::output;

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Container name (defaults to the image's base name).
    #[arg(short, long)]
    pub name: Option<String>,

    /// Address the SPC-mode container.
    #[arg(short, long)]
    pub spc: bool,

    /// Image reference.
    pub image: String,
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if the image or container cannot be inspected.
pub fn execute(args: StatusArgs, ctx: &Context) -> anyhow::Result<()> {
    let app = ctx.application(&args.image, args.name, args.spc)?;
    let status = app.status();
    println!("{:<10} {}", "Image:", status.image);
    println!("{:<10} {}", "Container:", status.name);
    println!("{:<10} {}", "Exists:", output::yes_no(status.exists));
    println!("{:<10} {}", "Running:", output::yes_no(status.running));
    println!("{:<10} {}", "PID:", output::or_dash(status.pid));
    println!("{:<10} {}", "Address:", output::or_dash(status.address));
    Ok(())
}
