//! `offgrid keys`: list stored request identities in insertion order.

use std::io::Write;

use anyhow::{Result, anyhow};

use crate::context::Context;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Generation name, e.g. `app-v1`
    pub generation: String,
}

pub async fn run(ctx: &Context, args: Args, out: &mut impl Write) -> Result<()> {
    let db = ctx.engine.generations().db();
    let handle = db
        .existing_generation(&args.generation)
        .await?
        .ok_or_else(|| anyhow!("no generation named {}", args.generation))?;

    for identity in db.entry_keys(&handle).await? {
        writeln!(out, "{identity}")?;
    }
    Ok(())
}
