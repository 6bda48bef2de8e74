//! `offgrid activate`: prune generations from other versions.

use std::io::Write;

use anyhow::Result;

use crate::context::Context;

pub async fn run(ctx: &Context, out: &mut impl Write) -> Result<()> {
    let generations = ctx.engine.generations();
    let deleted = generations.activate_prune().await?;
    let names = generations.names();

    writeln!(out, "active: {} {}", names.asset, names.api)?;
    if deleted.is_empty() {
        writeln!(out, "nothing to prune")?;
    }
    for name in deleted {
        writeln!(out, "deleted {name}")?;
    }
    Ok(())
}
