//! `atomic update`: Pull the latest version of an image.

use std::sync::Arc;

use atomic_common::error::AtomicError;
use atomic_runtime::image::Image;
use clap::Args;

use super::Context;

/// Arguments for the `update` command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Force-delete containers created from the image first.
    #[arg(short, long)]
    pub force: bool,

    /// Image reference.
    pub image: String,
}

/// Executes the `update` command.
///
/// # Errors
///
/// Returns an error if the image is not present locally or the pull fails.
pub fn execute(args: UpdateArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut image = Image::new(Arc::clone(&ctx.engine), &ctx.config, &args.image)?;
    if !image.exists() {
        return Err(AtomicError::NotFound {
            kind: "image",
            name: args.image,
        }
        .into());
    }
    image.update(args.force)?;
    Ok(())
}
