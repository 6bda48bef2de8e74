//! `offgrid generations`: list generations with entry counts.

use std::io::Write;

use anyhow::Result;

use crate::context::Context;

pub async fn run(ctx: &Context, out: &mut impl Write) -> Result<()> {
    let manager = ctx.engine.generations();
    for info in manager.db().describe_generations().await? {
        let marker = if manager.names().contains(&info.name) { "*" } else { " " };
        writeln!(out, "{marker} {:<24} {:>6} entries  created {}", info.name, info.entries, info.created_at)?;
    }
    Ok(())
}
