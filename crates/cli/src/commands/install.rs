//! `offgrid install`: populate the asset generation from the manifest.

use std::io::Write;

use anyhow::Result;

use crate::context::Context;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Prune stale generations after a successful install
    #[arg(long)]
    pub activate: bool,
}

pub async fn run(ctx: &Context, args: Args, out: &mut impl Write) -> Result<()> {
    let generations = ctx.engine.generations();
    let stored = generations.install_populate(ctx.engine.network(), &ctx.manifest).await?;
    writeln!(out, "installed {stored} entries into {}", generations.names().asset)?;

    if args.activate {
        super::activate::run(ctx, out).await?;
    }
    Ok(())
}
