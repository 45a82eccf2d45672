//! `atomic version`: Print the image's Name-Version-Release.

use std::sync::Arc;

use atomic_runtime::image::Image;
use clap::Args;

use super::Context;

/// Arguments for the `version` command.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Image reference.
    pub image: String,
}

/// Executes the `version` command, pulling the image if it is not present.
///
/// # Errors
///
/// Returns an error if the image cannot be pulled or inspected.
pub fn execute(args: VersionArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut image = Image::new(Arc::clone(&ctx.engine), &ctx.config, &args.image)?;
    println!("{}", image.version()?);
    Ok(())
}
