//! `atomic info`: Show the labels an image declares.

use std::sync::Arc;

use atomic_runtime::image::Image;
use clap::Args;

use super::Context;
use crate::output;

/// Arguments for the `info` command.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Also show labels reserved for tooling.
    #[arg(short = 'x', long)]
    pub extended: bool,

    /// Image reference.
    pub image: String,
}

/// Executes the `info` command, pulling the image if it is not present.
///
/// # Errors
///
/// Returns an error if the image cannot be pulled or inspected.
pub fn execute(args: InfoArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut image = Image::new(Arc::clone(&ctx.engine), &ctx.config, &args.image)?;
    let mut labels = image.info()?;
    if args.extended {
        labels.extend(image.extra_info()?);
    }

    if labels.is_empty() {
        println!("{} declares no labels.", args.image);
        return Ok(());
    }
    let rows: Vec<_> = labels.into_iter().collect();
    print!("{}", output::label_table(&rows));
    Ok(())
}
