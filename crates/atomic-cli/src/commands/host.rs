//! `atomic host`: Pass arguments through to the host update tool.

use clap::Args;

use super::Context;

/// Arguments for the `host` command.
#[derive(Args, Debug)]
pub struct HostArgs {
    /// Arguments forwarded verbatim.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Executes the `host` command.
///
/// # Errors
///
/// Returns an error if the tool cannot be spawned or exits non-zero.
pub fn execute(args: HostArgs, ctx: &Context) -> anyhow::Result<()> {
    atomic_runtime::host::passthrough(&ctx.config.host_tool, &args.args)?;
    Ok(())
}
