//! `offgrid fetch`: run one request through the engine.

use std::io::Write;

use anyhow::{Result, bail};
use offgrid_core::{Request, RequestMode, Route};

use crate::context::Context;

#[derive(clap::Args, Debug)]
pub struct Args {
    /// URL to fetch; paths resolve against the configured origin
    pub url: String,
    /// HTTP method. Anything but GET bypasses the caches
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,
    /// Issue the request as a document navigation
    #[arg(long)]
    pub navigate: bool,
    /// Request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,
    /// Print status and response headers before the body
    #[arg(short, long)]
    pub include: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw.split_once(':').ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name cannot be empty".into());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub async fn run(ctx: &Context, args: Args, out: &mut impl Write) -> Result<()> {
    let mode = if args.navigate { RequestMode::Navigate } else { RequestMode::default() };
    let mut request = Request::new(&args.method, &args.url, mode, &ctx.origin)?;
    if let Some(data) = args.data {
        if request.is_get() {
            bail!("GET requests cannot carry a body");
        }
        request = request.with_body(data);
    }
    for (name, value) in args.headers {
        request = request.with_header(name, value);
    }

    let route = ctx.engine.route(&request);
    let response = ctx.engine.handle(&request).await?;

    let route = match route {
        Route::Bypass => "bypass".to_string(),
        Route::Fulfill(class) => format!("{class:?}"),
    };
    tracing::info!(url = %request.url, route, status = response.status, source = ?response.source, "fetched");

    if args.include {
        writeln!(out, "{} ({:?}, {})", response.status, response.source, route)?;
        for (name, value) in &response.headers {
            writeln!(out, "{name}: {value}")?;
        }
        writeln!(out)?;
    }
    out.write_all(&response.body)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::context;
    use offgrid_core::{RequestIdentity, Response, ResponseSource};

    fn args(url: &str) -> Args {
        Args {
            url: url.into(),
            method: "GET".into(),
            navigate: false,
            headers: Vec::new(),
            data: None,
            include: false,
        }
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header("Accept: text/html").unwrap(), ("Accept".to_string(), "text/html".to_string()));
        assert_eq!(parse_header("X-Empty:").unwrap(), ("X-Empty".to_string(), String::new()));
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(" : value").is_err());
    }

    #[tokio::test]
    async fn test_fetch_cached_asset_offline() {
        let ctx = context().await;
        let generations = ctx.engine.generations();
        let url = ctx.origin.join("/app.css").unwrap();
        let stored = Response::new(200, vec![("content-type".into(), "text/css".into())], "body{}", ResponseSource::Network);
        generations.db().put_entry(generations.assets(), &RequestIdentity::get(&url), &stored).await.unwrap();

        let mut out = Vec::new();
        run(&ctx, Args { include: true, ..args("/app.css") }, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("200 (Cache, StaticAsset)\n"));
        assert!(text.contains("content-type: text/css\n"));
        assert!(text.ends_with("\n\nbody{}"));
    }

    #[tokio::test]
    async fn test_fetch_get_with_body_rejected() {
        let ctx = context().await;
        let mut out = Vec::new();
        let result = run(&ctx, Args { data: Some("x".into()), ..args("/api/items") }, &mut out).await;
        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
